//! `config` subcommand

use std::path::PathBuf;

use abscissa_core::{
    config::Override, status_err, status_ok, tracing::debug, Application, Command,
    FrameworkError, Runnable, Shutdown,
};
use clap::Parser;
use conflate::Merge;

use crate::{config::UploadServerConfig, error::AppResult, prelude::UPLOAD_SERVER_APP};

/// `config` subcommand
///
/// Writes the configuration the server would run with, including the
/// options given here, to a TOML file.
#[derive(Command, Debug, Parser)]
pub struct ConfigCmd {
    /// File to write the configuration to
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Server settings
    #[clap(flatten)]
    context: UploadServerConfig,
}

impl Override<UploadServerConfig> for ConfigCmd {
    fn override_config(
        &self,
        mut config: UploadServerConfig,
    ) -> Result<UploadServerConfig, FrameworkError> {
        config.merge(self.context.clone());
        Ok(config)
    }
}

impl Runnable for ConfigCmd {
    fn run(&self) {
        if let Err(err) = self.inner_run() {
            status_err!("{}", err);
            UPLOAD_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
        }
    }
}

impl ConfigCmd {
    fn inner_run(&self) -> AppResult<()> {
        let config = UPLOAD_SERVER_APP.config();
        debug!(?config, "Writing UploadServerConfig.");

        config.to_file(&self.path)?;
        status_ok!("Written", "configuration to `{}`", self.path.display());

        Ok(())
    }
}
