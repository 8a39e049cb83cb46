use std::{net::SocketAddr, sync::Arc};

use axum::body::Bytes;

use crate::{
    acl::{AclChecker, IpAllowList},
    auth::{AuthChecker, UploadSecret},
    config::{normalize_public_path, DEFAULT_MAX_SIZE_MB, DEFAULT_PUBLIC_PATH},
    naming::NameStrategy,
    storage::Storage,
};

/// Shared state handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<dyn Storage>,
    secret: UploadSecret,
    acl: IpAllowList,
    naming: NameStrategy,
    public_path: String,
    max_size_mb: u64,
    not_found_page: Option<Bytes>,
    listen: SocketAddr,
}

impl AppState {
    pub fn new(storage: impl Storage, listen: SocketAddr) -> Self {
        Self {
            storage: Arc::new(storage),
            secret: UploadSecret::default(),
            acl: IpAllowList::default(),
            naming: NameStrategy::default(),
            public_path: DEFAULT_PUBLIC_PATH.to_string(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            not_found_page: None,
            listen,
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: UploadSecret) -> Self {
        self.secret = secret;
        self
    }

    #[must_use]
    pub fn with_acl(mut self, acl: IpAllowList) -> Self {
        self.acl = acl;
        self
    }

    #[must_use]
    pub fn with_naming(mut self, naming: NameStrategy) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn with_public_path(mut self, public_path: &str) -> Self {
        self.public_path = normalize_public_path(public_path);
        self
    }

    #[must_use]
    pub fn with_max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    #[must_use]
    pub fn with_not_found_page(mut self, page: Option<Bytes>) -> Self {
        self.not_found_page = page;
        self
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn auth(&self) -> &impl AuthChecker {
        &self.secret
    }

    pub fn acl(&self) -> &impl AclChecker {
        &self.acl
    }

    pub const fn naming(&self) -> NameStrategy {
        self.naming
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    pub const fn max_size_mb(&self) -> u64 {
        self.max_size_mb
    }

    /// Request body limit in bytes
    pub fn max_body_bytes(&self) -> usize {
        usize::try_from(self.max_size_mb.saturating_mul(1 << 20)).unwrap_or(usize::MAX)
    }

    pub fn not_found_page(&self) -> Option<&Bytes> {
        self.not_found_page.as_ref()
    }

    pub const fn listen(&self) -> SocketAddr {
        self.listen
    }
}
