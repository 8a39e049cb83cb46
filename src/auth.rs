use sha2::{Digest, Sha256};

use crate::config::AuthSettings;

/// Checks the shared secret sent along with uploads
pub trait AuthChecker: Send + Sync + 'static {
    fn verify(&self, provided: Option<&str>) -> bool;
}

/// The configured upload secret.
///
/// Only the SHA-256 digest is kept, the secret itself is not retained.
#[derive(Clone, Default)]
pub struct UploadSecret {
    digest: Option<Vec<u8>>,
}

impl std::fmt::Debug for UploadSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSecret")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl UploadSecret {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            digest: secret
                .filter(|s| !s.is_empty())
                .map(|s| Sha256::digest(s.as_bytes()).to_vec()),
        }
    }

    pub fn from_config(settings: &AuthSettings) -> Self {
        Self::new(settings.secret.as_deref())
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }
}

impl AuthChecker for UploadSecret {
    // verify checks the provided secret against the configured one.
    // returns true if no secret is configured.
    fn verify(&self, provided: Option<&str>) -> bool {
        match &self.digest {
            Some(expected) => provided.is_some_and(|provided| {
                Sha256::digest(provided.as_bytes()).as_slice() == expected.as_slice()
            }),
            None => true,
        }
    }
}
