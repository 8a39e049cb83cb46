use std::{
    fmt::Debug,
    io,
    path::{Path, PathBuf},
};

use tokio::fs::{create_dir_all, read_dir};
use tracing::{debug, warn};

use crate::{
    error::{ApiErrorKind, ApiResult},
    handlers::file_helpers::{save_bytes, WriteOrDeleteFile},
    naming::{NameStrategy, MAX_NAME_ATTEMPTS},
};

/// A single entry of a served directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync + Debug + 'static {
    fn init(path: &Path) -> io::Result<Self>
    where
        Self: Sized;

    /// Root directory of the storage
    fn path(&self) -> &Path;

    /// Map a percent-decoded URL path to a location below the storage root
    fn resolve(&self, request_path: &str) -> PathBuf {
        let mut resolved = self.path().to_path_buf();
        for segment in clean_segments(request_path) {
            resolved.push(segment);
        }
        resolved
    }

    /// Create a new file `name` in the storage root.
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] if the name is taken.
    async fn create_file(&self, name: &str) -> io::Result<WriteOrDeleteFile>;

    /// Entries of the directory at `path`, sorted by name
    async fn read_dir(&self, path: &Path) -> ApiResult<Vec<DirEntry>>;

    /// Store an upload under a name generated by `strategy` and return that name
    async fn store(
        &self,
        strategy: NameStrategy,
        client_name: &str,
        data: &[u8],
    ) -> ApiResult<String> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = strategy.file_name(data, client_name, attempt);

            match self.create_file(&name).await {
                Ok(file) => {
                    save_bytes(file, data).await?;
                    return Ok(name);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    if strategy.is_content_addressed() {
                        debug!("[store] `{name}` already stored, skipping write");
                        return Ok(name);
                    }
                    warn!("[store] name collision on `{name}`, attempt {attempt}");
                }
                Err(err) => {
                    return Err(ApiErrorKind::WritingToFileFailed(format!(
                        "Could not create `{name}`: {err}"
                    )))
                }
            }
        }

        Err(ApiErrorKind::NameCollision(MAX_NAME_ATTEMPTS))
    }
}

/// Clean a URL path into its segments the way a URL path is normalised:
/// empty and `.` segments are dropped, `..` removes the previous segment
/// and never climbs above the root.
pub fn clean_segments(request_path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let _ = segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments
}

#[derive(Clone, Debug)]
pub struct LocalStorage {
    path: PathBuf,
}

#[async_trait::async_trait]
impl Storage for LocalStorage {
    fn init(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn create_file(&self, name: &str) -> io::Result<WriteOrDeleteFile> {
        // the output directory may have been removed while running
        create_dir_all(&self.path).await?;
        WriteOrDeleteFile::new(self.path.join(name)).await
    }

    async fn read_dir(&self, path: &Path) -> ApiResult<Vec<DirEntry>> {
        let mut dir = read_dir(path)
            .await
            .map_err(|err| ApiErrorKind::ReadingDirectoryFailed(err.to_string()))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|err| ApiErrorKind::ReadingDirectoryFailed(err.to_string()))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|err| ApiErrorKind::GettingFileMetadataFailed(err.to_string()))?
                .is_dir();
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }
}
