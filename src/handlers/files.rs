use std::{fmt::Write, io, net::SocketAddr, path::Path};

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use axum_extra::{headers::Range, TypedHeader};
use axum_range::{KnownSize, Ranged};
use tokio::fs::{metadata, File};

use crate::{
    acl::AclChecker,
    error::{ApiErrorKind, ApiResult},
    state::AppState,
    storage::DirEntry,
};

/// Served instead of a listing when present in a directory
pub(crate) const INDEX_FILE: &str = "index.html";

/// serve_path
/// Interface: GET {public path}{path}
///
/// Paths ending in `/` are directory listings and only answered for
/// addresses on the allow-list.
pub(crate) async fn serve_path(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    range: Option<TypedHeader<Range>>,
) -> ApiResult<Response> {
    let raw_path = uri.path();
    let is_listing = raw_path.ends_with('/');

    tracing::debug!("[serve_path] path: {raw_path}, peer: {peer}");

    if is_listing && !state.acl().is_allowed(peer) {
        tracing::info!("[serve_path] listing of `{raw_path}` denied for {peer}");
        return Err(ApiErrorKind::NotFound);
    }

    let relative = raw_path
        .strip_prefix(state.public_path())
        .unwrap_or_default();
    let decoded = urlencoding::decode(relative).map_err(|_| ApiErrorKind::NotFound)?;
    let fs_path = state.storage().resolve(&decoded);

    let Ok(meta) = metadata(&fs_path).await else {
        return Err(ApiErrorKind::NotFound);
    };

    if meta.is_dir() {
        if !is_listing {
            return Ok(redirect(&format!("{raw_path}/"), uri.query()));
        }

        let index = fs_path.join(INDEX_FILE);
        if metadata(&index).await.is_ok_and(|meta| meta.is_file()) {
            return serve_file(&index, range).await;
        }

        let entries = state.storage().read_dir(&fs_path).await?;
        return Ok(Html(render_listing(&entries)).into_response());
    }

    if is_listing {
        return Ok(redirect(raw_path.trim_end_matches('/'), uri.query()));
    }

    serve_file(&fs_path, range).await
}

/// redirect_to_public_path
/// Interface: GET {public path without trailing slash}
pub(crate) async fn redirect_to_public_path(State(state): State<AppState>, uri: Uri) -> Response {
    redirect(state.public_path(), uri.query())
}

async fn serve_file(path: &Path, range: Option<TypedHeader<Range>>) -> ApiResult<Response> {
    let file = File::open(path).await.map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ApiErrorKind::NotFound,
        _ => ApiErrorKind::OpeningFileFailed(format!("{err:?}")),
    })?;

    let body = KnownSize::file(file)
        .await
        .map_err(|err| ApiErrorKind::GettingFileMetadataFailed(format!("{err:?}")))?;
    let range = range.map(|TypedHeader(range)| range);

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let mut response = Ranged::new(range, body).into_response();
    if let Ok(content_type) = HeaderValue::from_str(mime.as_ref()) {
        let _ = response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }

    Ok(response)
}

fn redirect(location: &str, query: Option<&str>) -> Response {
    let location = match query {
        Some(query) => format!("{location}?{query}"),
        None => location.to_string(),
    };

    match HeaderValue::from_str(&location) {
        Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response(),
        Err(_) => ApiErrorKind::NotFound.into_response(),
    }
}

/// HTML listing of a directory, one link per entry
pub(crate) fn render_listing(entries: &[DirEntry]) -> String {
    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<a href=\"{}{suffix}\">{}{suffix}</a>",
            urlencoding::encode(&entry.name),
            html_escape::encode_text(&entry.name),
        );
    }

    html.push_str("</pre>\n");
    html
}
