//! `serve` subcommand

use abscissa_core::{
    config::Override,
    status_err,
    tracing::{debug, info, warn},
    Application, Command, FrameworkError, Runnable, Shutdown,
};
use clap::Parser;
use conflate::Merge;

use crate::{
    config::UploadServerConfig, context::ServerRuntimeContext, error::AppResult,
    prelude::UPLOAD_SERVER_APP, storage::LocalStorage, web::start_web_server,
};

/// `serve` subcommand
///
/// Every option given here overrides the value from the configuration file.
#[derive(Command, Debug, Parser)]
pub struct ServeCmd {
    /// Server settings
    #[clap(flatten)]
    context: UploadServerConfig,
}

impl Override<UploadServerConfig> for ServeCmd {
    fn override_config(
        &self,
        mut config: UploadServerConfig,
    ) -> Result<UploadServerConfig, FrameworkError> {
        debug!(?config, "UploadServerConfig before merge.");
        debug!(?self.context, "Command context from CLI.");

        config.merge(self.context.clone());

        Ok(config)
    }
}

impl Runnable for ServeCmd {
    /// Start the application.
    fn run(&self) {
        if let Err(tokio_err) = abscissa_tokio::run(&UPLOAD_SERVER_APP, async {
            if let Err(err) = self.inner_run().await {
                status_err!("{}", err);
                UPLOAD_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
            }
        }) {
            status_err!("{}", tokio_err);
            UPLOAD_SERVER_APP.shutdown_with_exitcode(Shutdown::Crash, 1);
        };
    }
}

impl ServeCmd {
    pub async fn inner_run(&self) -> AppResult<()> {
        let server_config = UPLOAD_SERVER_APP.config();

        debug!(?server_config, "Loaded UploadServerConfig.");

        let runtime_ctx: ServerRuntimeContext<LocalStorage> =
            ServerRuntimeContext::from_config(server_config.clone())?;

        _ = tokio::spawn(async move {
            // With `CI` set, shut down on our own after a few seconds so
            // integration tests can run the binary.
            if std::env::var("CI").is_ok() {
                tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                info!("Shutting down gracefully ...");
                UPLOAD_SERVER_APP.shutdown(Shutdown::Graceful);
            }

            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for the shutdown signal: {err}");
                return;
            }
            info!("Shutting down gracefully ...");
            UPLOAD_SERVER_APP.shutdown(Shutdown::Graceful);
        });

        start_web_server(runtime_ctx).await?;

        Ok(())
    }
}
