use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::OnceLock,
};

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Method, Request},
    Router,
};
use tempfile::TempDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    acl::IpAllowList,
    auth::UploadSecret,
    state::AppState,
    storage::{LocalStorage, Storage},
    web::build_router,
};

pub(crate) const TEST_SECRET: &str = "s3cret";
pub(crate) const TEST_HOST: &str = "files.example.com";
const TEST_BOUNDARY: &str = "----upload-server-test-boundary";

// ------------------------------------------------
// test facility for tracing
// ------------------------------------------------

/// The global tracing subscriber may only be installed once, while every
/// test calls this.
static TRACER: OnceLock<()> = OnceLock::new();

pub(crate) fn init_tracing() {
    TRACER.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "upload_server=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

// ------------------------------------------------
// test facility for creating a minimum test environment
// ------------------------------------------------

/// State backed by a fresh `out` directory inside a temporary directory.
///
/// The secret is [`TEST_SECRET`] and only `127.0.0.1` may list directories.
pub(crate) fn test_state() -> (TempDir, AppState) {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::init(&dir.path().join("out")).unwrap();
    let state = AppState::new(storage, SocketAddr::from(([127, 0, 0, 1], 8000)))
        .with_secret(UploadSecret::new(Some(TEST_SECRET)))
        .with_acl(IpAllowList::new([IpAddr::V4(Ipv4Addr::LOCALHOST)]));

    (dir, state)
}

/// Router for `state` with requests coming from `127.0.0.1`
pub(crate) fn test_router(state: AppState) -> Router {
    build_router(state, true).layer(MockConnectInfo(SocketAddr::from((
        [127, 0, 0, 1],
        50000,
    ))))
}

// ------------------------------------------------
// test facility for multipart uploads
// ------------------------------------------------

pub(crate) struct TestUpload<'a> {
    file_name: &'a str,
    data: &'a [u8],
}

impl<'a> TestUpload<'a> {
    pub(crate) const fn new(file_name: &'a str, data: &'a [u8]) -> Self {
        Self { file_name, data }
    }
}

/// A `multipart/form-data` POST to `uri` with an optional `secret` field and
/// an optional `file` field.
pub(crate) fn multipart_request(
    uri: &str,
    secret: Option<&str>,
    upload: Option<TestUpload<'_>>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    if let Some(secret) = secret {
        body.extend_from_slice(
            format!(
                "--{TEST_BOUNDARY}\r\nContent-Disposition: form-data; name=\"secret\"\r\n\r\n{secret}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(upload) = upload {
        body.extend_from_slice(
            format!(
                "--{TEST_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                upload.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(upload.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{TEST_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .uri(uri)
        .method(Method::POST)
        .header(header::HOST, TEST_HOST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={TEST_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
