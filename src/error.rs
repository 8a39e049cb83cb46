//! Error types

use std::{
    fmt::{self, Display},
    io,
    ops::Deref,
};

use abscissa_core::error::{BoxError, Context};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use displaydoc::Display;
use thiserror::Error;

pub type AppResult<T> = Result<T, Error>;
pub type ApiResult<T> = Result<T, ApiErrorKind>;

/// Kinds of errors raised while setting up or running the application
#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorKind {
    /// Error in configuration file
    #[error("config error")]
    Config,

    /// Input/output error
    #[error("I/O error")]
    Io,

    /// General storage error
    #[error("storage error")]
    GeneralStorageError,

    /// Web server could not be started or crashed
    #[error("web server error")]
    WebServer,
}

impl ErrorKind {
    /// Create an error context from this error
    pub fn context(self, source: impl Into<BoxError>) -> Context<Self> {
        Context::new(self, Some(source.into()))
    }
}

/// Error type
#[derive(Debug)]
pub struct Error(Box<Context<ErrorKind>>);

impl Deref for Error {
    type Target = Context<ErrorKind>;

    fn deref(&self) -> &Context<ErrorKind> {
        &self.0
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Context::new(kind, None).into()
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(context: Context<ErrorKind>) -> Self {
        Self(Box::new(context))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io.context(err).into()
    }
}

/// Errors surfaced to HTTP clients
#[derive(Debug, Display, Error)]
pub enum ApiErrorKind {
    /// 404 page not found
    NotFound,
    /// http: no such file
    MissingFile,
    /// could not read multipart form: `{0}`
    MultipartError(String),
    /// request body exceeds the upload limit of {0} MB
    PayloadTooLarge(u64),
    /// error writing file: `{0}`
    WritingToFileFailed(String),
    /// error finalizing file: `{0}`
    FinalizingFileFailed(String),
    /// error getting file metadata: `{0}`
    GettingFileMetadataFailed(String),
    /// error opening file: `{0}`
    OpeningFileFailed(String),
    /// error reading directory: `{0}`
    ReadingDirectoryFailed(String),
    /// no free file name after {0} attempts
    NameCollision(usize),
}

impl IntoResponse for ApiErrorKind {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MissingFile | Self::MultipartError(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::WritingToFileFailed(_)
            | Self::FinalizingFileFailed(_)
            | Self::GettingFileMetadataFailed(_)
            | Self::OpeningFileFailed(_)
            | Self::ReadingDirectoryFailed(_)
            | Self::NameCollision(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Self::NotFound => format!("{self}\n"),
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_api_error_status_codes_passes() {
        assert_eq!(
            ApiErrorKind::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiErrorKind::MissingFile.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiErrorKind::PayloadTooLarge(10).into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiErrorKind::NameCollision(16).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_messages_passes() {
        assert_eq!(ApiErrorKind::MissingFile.to_string(), "http: no such file");
        assert_eq!(
            ApiErrorKind::PayloadTooLarge(10).to_string(),
            "request body exceeds the upload limit of 10 MB"
        );
    }

    #[test]
    fn test_app_error_from_io_passes() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(*err.kind(), ErrorKind::Io);
    }
}
