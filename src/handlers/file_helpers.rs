use std::{
    fs,
    io::Result as IoResult,
    path::PathBuf,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncWrite, AsyncWriteExt},
};

use crate::error::{ApiErrorKind, ApiResult};

// helper struct which is like a tokio::fs::File but removes the file
// if finalize() was not called.
#[derive(Debug)]
pub struct WriteOrDeleteFile {
    file: File,
    path: PathBuf,
    finalized: bool,
}

#[async_trait::async_trait]
pub trait Finalizer {
    async fn finalize(&mut self) -> ApiResult<()>;
}

impl WriteOrDeleteFile {
    /// Creates the file, failing with `AlreadyExists` if the name is taken.
    pub async fn new(file_path: PathBuf) -> IoResult<Self> {
        Ok(Self {
            file: OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&file_path)
                .await?,
            path: file_path,
            finalized: false,
        })
    }
}

#[async_trait::async_trait]
impl Finalizer for WriteOrDeleteFile {
    async fn finalize(&mut self) -> ApiResult<()> {
        self.file.sync_all().await.map_err(|err| {
            ApiErrorKind::FinalizingFileFailed(format!("Could not sync file: {err}"))
        })?;
        self.finalized = true;
        Ok(())
    }
}

impl AsyncWrite for WriteOrDeleteFile {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<IoResult<usize>> {
        Pin::new(&mut self.get_mut().file).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        Pin::new(&mut self.get_mut().file).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        Pin::new(&mut self.get_mut().file).poll_shutdown(cx)
    }
}

impl Drop for WriteOrDeleteFile {
    fn drop(&mut self) {
        if !self.finalized {
            // ignore errors
            fs::remove_file(&self.path).unwrap_or(());
        }
    }
}

/// Writes `data` into `write_stream` and finalizes it.
pub(crate) async fn save_bytes(
    mut write_stream: impl AsyncWrite + Unpin + Finalizer + Send,
    data: &[u8],
) -> ApiResult<()> {
    write_stream
        .write_all(data)
        .await
        .map_err(|err| ApiErrorKind::WritingToFileFailed(format!("{err:?}")))?;

    tracing::debug!("[file written] bytes: {}", data.len());
    write_stream.finalize().await
}
