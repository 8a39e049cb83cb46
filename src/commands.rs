//! `UploadServer` Subcommands
//!
//! - `serve`: start the upload server
//! - `config`: write the effective configuration to a file
//! - `--version`: print application version
//!
//! See the `impl Configurable` below for how the path to the application's
//! configuration file is determined.

mod config;
mod serve;

use crate::{
    commands::{config::ConfigCmd, serve::ServeCmd},
    config::UploadServerConfig,
};
use abscissa_core::{
    config::Override, tracing::info, Command, Configurable, FrameworkError, Runnable,
};
use clap::builder::{
    styling::{AnsiColor, Effects},
    Styles,
};
use std::path::PathBuf;

/// `UploadServer` Configuration Filename
pub const CONFIG_FILE: &str = "upload_server.toml";

/// `UploadServer` Subcommands
#[derive(clap::Parser, Command, Debug, Runnable)]
pub enum UploadServerCmd {
    /// Start a server with the specified configuration
    Serve(ServeCmd),

    /// Write the effective configuration to a TOML file
    Config(ConfigCmd),
}

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Red.on_default() | Effects::BOLD)
        .usage(AnsiColor::Red.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
}

/// Entry point for the application. It needs to be a struct to allow using subcommands!
#[derive(clap::Parser, Command, Debug)]
#[command(author, about, name="upload-server", styles=styles(), version = env!("CARGO_PKG_VERSION"))]
pub struct EntryPoint {
    #[command(subcommand)]
    cmd: UploadServerCmd,

    /// Enable verbose logging
    #[arg(short, long, global = true, env = "UPLOAD_SERVER_VERBOSE")]
    pub verbose: bool,

    /// Use the specified config file
    #[arg(short, long, global = true, env = "UPLOAD_SERVER_CONFIG_PATH")]
    pub config: Option<String>,
}

impl Runnable for EntryPoint {
    fn run(&self) {
        self.cmd.run();
    }
}

impl Configurable<UploadServerConfig> for EntryPoint {
    /// Location of the configuration file
    ///
    /// Without `--config` the built-in defaults are used, unless
    /// [`CONFIG_FILE`] exists in the working directory.
    fn config_path(&self) -> Option<PathBuf> {
        let Some(filename) = self.config.as_ref().map(PathBuf::from) else {
            let default = PathBuf::from(CONFIG_FILE);
            if default.is_file() {
                info!("Using configuration file: `{}`", default.display());
                return Some(default);
            }
            info!("No configuration file provided.");
            return None;
        };

        // a missing file given on the command line is a hard error
        info!("Using configuration file: `{}`", filename.display());
        Some(filename)
    }

    /// Command-line options take precedence over the configuration file.
    fn process_config(
        &self,
        config: UploadServerConfig,
    ) -> Result<UploadServerConfig, FrameworkError> {
        match &self.cmd {
            UploadServerCmd::Serve(cmd) => cmd.override_config(config),
            UploadServerCmd::Config(cmd) => cmd.override_config(config),
        }
    }
}
