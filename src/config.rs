//! `UploadServer` Config
//!
//! See instructions in `commands.rs` to specify the path to your
//! application's configuration file and/or command-line options
//! for specifying it.

use std::{
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use clap::{Args, Parser};
use conflate::Merge;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppResult, ErrorKind},
    naming::NameStrategy,
};

/// `UploadServer` Configuration
#[derive(Clone, Debug, Deserialize, Serialize, Default, Merge, Parser)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct UploadServerConfig {
    /// Server settings
    #[command(flatten)]
    pub server: ConnectionSettings,

    /// Storage settings
    #[command(flatten)]
    pub storage: StorageSettings,

    /// Upload secret settings
    #[command(flatten)]
    pub auth: AuthSettings,

    /// Directory listing access settings
    #[command(flatten)]
    pub access: AccessSettings,

    /// Custom pages
    #[command(flatten)]
    pub pages: PageSettings,

    /// Logging settings
    #[command(flatten)]
    pub log: LogSettings,
}

/// Overwrite the left value with the right value if the right value is `Some`.
fn overwrite_with_some<T>(left: &mut Option<T>, right: Option<T>) {
    if right.is_some() {
        *left = right;
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Parser)]
#[serde(deny_unknown_fields, default, rename_all = "kebab-case")]
pub struct ConnectionSettings {
    /// IP address and port to bind to
    #[arg(long, env = "UPLOAD_SERVER_LISTEN")]
    #[merge(strategy = overwrite_with_some)]
    pub listen: Option<SocketAddr>,

    /// Virtual public path uploaded files are served under
    #[arg(long, env = "UPLOAD_SERVER_PUBLIC_PATH")]
    #[merge(strategy = overwrite_with_some)]
    pub public_path: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            listen: Some(default_socket_address()),
            public_path: Some(DEFAULT_PUBLIC_PATH.to_string()),
        }
    }
}

pub(crate) const DEFAULT_PUBLIC_PATH: &str = "/!/";

pub(crate) fn default_socket_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 80))
}

/// Normalise a public path so it starts and ends with a single `/`
pub(crate) fn normalize_public_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Parser)]
#[serde(deny_unknown_fields, default, rename_all = "kebab-case")]
pub struct StorageSettings {
    /// Uploads output directory
    #[arg(long = "output", env = "UPLOAD_SERVER_OUTPUT")]
    #[merge(strategy = overwrite_with_some)]
    pub output_dir: Option<PathBuf>,

    /// Max upload size in MB
    #[arg(long = "max-size", env = "UPLOAD_SERVER_MAX_SIZE")]
    #[merge(strategy = overwrite_with_some)]
    pub max_size: Option<u64>,

    /// How names of stored files are generated
    #[arg(long, value_enum, env = "UPLOAD_SERVER_NAMING")]
    #[merge(strategy = overwrite_with_some)]
    pub naming: Option<NameStrategy>,
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

pub(crate) const DEFAULT_MAX_SIZE_MB: u64 = 10;

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            output_dir: Some(default_output_dir()),
            max_size: Some(DEFAULT_MAX_SIZE_MB),
            naming: Some(NameStrategy::default()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Default, Args)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
#[group(id = "auth")]
pub struct AuthSettings {
    /// Secret key for allowing uploads (allow all if none)
    #[arg(long, env = "UPLOAD_SERVER_SECRET", hide_env_values = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[merge(strategy = overwrite_with_some)]
    pub secret: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Args)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
#[group(id = "access")]
pub struct AccessSettings {
    /// IP addresses allowed to display file lists
    #[arg(long, value_delimiter = ',', env = "UPLOAD_SERVER_IPLIST")]
    #[merge(strategy = overwrite_with_some)]
    pub iplist: Option<Vec<IpAddr>>,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            iplist: Some(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Default, Args)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
#[group(id = "pages")]
pub struct PageSettings {
    /// Optional HTML page returned for requests that are not found
    #[arg(long = "not-found-page", env = "UPLOAD_SERVER_NOT_FOUND_PAGE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[merge(strategy = overwrite_with_some)]
    pub not_found: Option<PathBuf>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Merge, Default, Args)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
#[group(id = "log")]
pub struct LogSettings {
    /// Do not log each handled request
    #[arg(long = "no-request-log")]
    #[merge(strategy = conflate::bool::overwrite_false)]
    pub disable_request_log: bool,
}

impl LogSettings {
    pub const fn is_request_log_enabled(&self) -> bool {
        !self.disable_request_log
    }
}

impl UploadServerConfig {
    pub fn from_file(pth: &Path) -> AppResult<Self> {
        let s = fs::read_to_string(pth)?;

        let config: Self = toml::from_str(&s).map_err(|err| {
            ErrorKind::Config.context(format!(
                "Could not parse file: {} due to {}",
                pth.to_string_lossy(),
                err
            ))
        })?;

        Ok(config)
    }

    pub fn to_file(&self, pth: &Path) -> AppResult<()> {
        let toml_string = toml::to_string(&self).map_err(|err| {
            ErrorKind::Config.context(format!(
                "Could not serialize configuration to toml due to {err}"
            ))
        })?;

        fs::write(pth, toml_string)?;

        Ok(())
    }
}
