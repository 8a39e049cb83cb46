use std::{path::PathBuf, time::Duration};

use assert_cmd::Command;
use tempfile::TempDir;
use upload_server::config::UploadServerConfig;

pub trait AssertCmdExt {
    /// Write `config` into `dir` and pass it with `-c`
    fn config(&mut self, dir: &TempDir, config: &UploadServerConfig) -> &mut Self;

    /// Enable test mode
    fn test_mode_args(&mut self) -> &mut Self;
}

impl AssertCmdExt for Command {
    fn config(&mut self, dir: &TempDir, config: &UploadServerConfig) -> &mut Self {
        let path: PathBuf = dir.path().join("upload_server.toml");
        config.to_file(&path).unwrap();

        self.args(["-c", &path.display().to_string()]);
        self
    }

    fn test_mode_args(&mut self) -> &mut Self {
        self.timeout(Duration::from_secs(10)) // Set a timeout of 10 seconds
            .args(["-v"]) // Enable verbose logging
            .env("CI", "1"); // Shut down after a few seconds

        self
    }
}
