//! `UploadServer` Abscissa Application

use crate::{commands::EntryPoint, config::UploadServerConfig};
use abscissa_core::{
    application::{self, AppCell},
    config::{self, CfgCell},
    trace, Application, FrameworkError, StandardPaths,
};
use abscissa_tokio::TokioComponent;

/// Application state
pub static UPLOAD_SERVER_APP: AppCell<UploadServerApp> = AppCell::new();

/// `UploadServer` Application
#[derive(Debug)]
pub struct UploadServerApp {
    /// Application configuration.
    config: CfgCell<UploadServerConfig>,

    /// Application state.
    state: application::State<Self>,
}

/// Initialize a new application instance.
///
/// By default no configuration is loaded, and the framework state is
/// initialized to a default, empty state (no components, threads, etc).
impl Default for UploadServerApp {
    fn default() -> Self {
        Self {
            config: CfgCell::default(),
            state: application::State::default(),
        }
    }
}

impl Application for UploadServerApp {
    /// Entrypoint command for this application.
    type Cmd = EntryPoint;

    /// Application configuration.
    type Cfg = UploadServerConfig;

    /// Paths to resources within the application.
    type Paths = StandardPaths;

    fn config(&self) -> config::Reader<UploadServerConfig> {
        self.config.read()
    }

    fn state(&self) -> &application::State<Self> {
        &self.state
    }

    /// Register the framework components plus the tokio runtime the
    /// web server runs on.
    fn register_components(&mut self, command: &Self::Cmd) -> Result<(), FrameworkError> {
        let mut components = self.framework_components(command)?;

        components.push(Box::new(TokioComponent::new()?));

        self.state.components_mut().register(components)
    }

    fn after_config(&mut self, config: Self::Cfg) -> Result<(), FrameworkError> {
        self.state.components_mut().after_config(&config)?;
        self.config.set_once(config);
        Ok(())
    }

    /// Get tracing configuration from command-line options
    fn tracing_config(&self, command: &EntryPoint) -> trace::Config {
        if command.verbose {
            trace::Config::verbose()
        } else {
            trace::Config::default()
        }
    }
}
