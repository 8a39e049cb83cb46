use std::{fs, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::body::Bytes;
use tracing::{debug, info, warn};

use crate::{
    acl::IpAllowList,
    auth::UploadSecret,
    config::{
        default_output_dir, default_socket_address, normalize_public_path, AccessSettings,
        AuthSettings, PageSettings, UploadServerConfig, DEFAULT_MAX_SIZE_MB, DEFAULT_PUBLIC_PATH,
    },
    error::{AppResult, ErrorKind},
    naming::NameStrategy,
    state::AppState,
    storage::Storage,
};

/// Everything the web server needs, resolved from the configuration
#[derive(Clone, Debug)]
pub struct ServerRuntimeContext<S>
where
    S: Storage + Clone,
{
    pub(crate) acl: IpAllowList,
    pub(crate) secret: UploadSecret,
    pub(crate) socket_address: SocketAddr,
    pub(crate) storage: S,
    pub(crate) naming: NameStrategy,
    pub(crate) public_path: String,
    pub(crate) max_size_mb: u64,
    pub(crate) not_found_page: Option<Bytes>,
    pub(crate) request_log: bool,
}

impl<S> ServerRuntimeContext<S>
where
    S: Storage + Clone,
{
    pub fn from_config(config: Arc<UploadServerConfig>) -> AppResult<Self> {
        let storage = Self::storage(
            config
                .storage
                .output_dir
                .clone()
                .unwrap_or_else(default_output_dir),
        )?;

        let socket_address =
            Self::socket_address(config.server.listen.unwrap_or_else(default_socket_address));

        let public_path = Self::public_path(config.server.public_path.as_deref());

        let max_size_mb = Self::max_size(config.storage.max_size)?;

        let naming = config.storage.naming.unwrap_or_default();
        info!("Naming uploads with the `{naming}` strategy.");

        let secret = Self::secret(&config.auth);

        let acl = Self::acl(&config.access);

        let not_found_page = Self::not_found_page(&config.pages)?;

        Ok(Self {
            acl,
            secret,
            socket_address,
            storage,
            naming,
            public_path,
            max_size_mb,
            not_found_page,
            request_log: config.log.is_request_log_enabled(),
        })
    }

    fn storage(output_dir: PathBuf) -> AppResult<S> {
        let storage = S::init(&output_dir).map_err(|err| {
            ErrorKind::GeneralStorageError.context(format!(
                "Could not create output directory `{}`: {err}",
                output_dir.display()
            ))
        })?;

        info!(
            "Using directory for storing uploads: `{}`",
            storage.path().display()
        );
        debug!(?storage, "Loaded Storage.");

        Ok(storage)
    }

    fn socket_address(address: SocketAddr) -> SocketAddr {
        debug!(?address, "Parsed socket address.");
        address
    }

    fn public_path(public_path: Option<&str>) -> String {
        let public_path = normalize_public_path(public_path.unwrap_or(DEFAULT_PUBLIC_PATH));
        info!("Serving uploads under `{public_path}`.");
        public_path
    }

    fn max_size(max_size: Option<u64>) -> AppResult<u64> {
        match max_size.unwrap_or(DEFAULT_MAX_SIZE_MB) {
            0 => Err(ErrorKind::Config
                .context("The maximum upload size must be at least 1 MB.")
                .into()),
            size => {
                debug!("Maximum upload size: {size} MB");
                Ok(size)
            }
        }
    }

    fn secret(settings: &AuthSettings) -> UploadSecret {
        let secret = UploadSecret::from_config(settings);
        if secret.is_enabled() {
            info!("Upload secret is enabled.");
        } else {
            info!("No upload secret configured.");
            warn!("This allows anyone to upload files. This should be considered insecure and is not recommended for production use.");
        }
        secret
    }

    fn acl(settings: &AccessSettings) -> IpAllowList {
        let acl = IpAllowList::from_config(settings);
        if acl.addresses().is_empty() {
            info!("Directory listings are disabled.");
        } else {
            info!("Directory listings allowed for: {:?}", acl.addresses());
        }
        acl
    }

    fn not_found_page(settings: &PageSettings) -> AppResult<Option<Bytes>> {
        let Some(path) = &settings.not_found else {
            return Ok(None);
        };

        let page = fs::read(path).map_err(|err| {
            ErrorKind::Io.context(format!(
                "Could not read not-found page `{}`: {err}",
                path.display()
            ))
        })?;
        info!("Using custom not-found page: `{}`", path.display());

        Ok(Some(Bytes::from(page)))
    }

    pub fn storage_path(&self) -> &std::path::Path {
        self.storage.path()
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.storage.clone(), self.socket_address)
            .with_secret(self.secret.clone())
            .with_acl(self.acl.clone())
            .with_naming(self.naming)
            .with_public_path(&self.public_path)
            .with_max_size_mb(self.max_size_mb)
            .with_not_found_page(self.not_found_page.clone())
    }
}
