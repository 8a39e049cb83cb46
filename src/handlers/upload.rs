use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
};
use tracing::{debug, info, warn};

use crate::{
    auth::AuthChecker,
    error::{ApiErrorKind, ApiResult},
    state::AppState,
};

/// Form field carrying the upload secret
pub(crate) const SECRET_FIELD: &str = "secret";

/// Form field carrying the uploaded file
pub(crate) const FILE_FIELD: &str = "file";

struct UploadedFile {
    client_name: String,
    data: Bytes,
}

/// upload_file
/// Interface: POST /upload (multipart form: `secret`, `file`)
///
/// Stores the file under a generated name and answers with its public URL.
/// A wrong secret is answered like an unknown route, also when the form
/// could not be read.
pub(crate) async fn upload_file(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let max_size = state.max_size_mb();

    let mut multipart = multipart.map_err(|rejection| {
        hide_unless_authorized(
            &state,
            None,
            ApiErrorKind::MultipartError(rejection.body_text()),
        )
    })?;

    let mut secret: Option<String> = None;
    let mut upload: Option<UploadedFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return Err(hide_unless_authorized(
                    &state,
                    secret.as_deref(),
                    multipart_error(&err, max_size),
                ))
            }
        };

        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(ToString::to_string);

        match (field_name.as_str(), file_name) {
            (SECRET_FIELD, _) => {
                let value = field.text().await.map_err(|err| {
                    hide_unless_authorized(&state, None, multipart_error(&err, max_size))
                })?;
                secret = Some(value);
            }
            (FILE_FIELD, Some(client_name)) if upload.is_none() => {
                let data = field.bytes().await.map_err(|err| {
                    hide_unless_authorized(
                        &state,
                        secret.as_deref(),
                        multipart_error(&err, max_size),
                    )
                })?;
                debug!("[upload] read `{client_name}` ({} bytes)", data.len());
                upload = Some(UploadedFile { client_name, data });
            }
            _ => debug!("[upload] ignoring form field `{field_name}`"),
        }
    }

    if !state.auth().verify(secret.as_deref()) {
        warn!("[upload] rejected upload with invalid secret");
        return Err(ApiErrorKind::NotFound);
    }

    let Some(UploadedFile { client_name, data }) = upload else {
        return Err(ApiErrorKind::MissingFile);
    };

    let name = state
        .storage()
        .store(state.naming(), &client_name, &data)
        .await?;

    info!(
        "[upload] stored `{client_name}` as `{name}` ({} bytes)",
        data.len()
    );

    // HTTP/2 carries the host in the `:authority` pseudo header
    let host = uri
        .authority()
        .map(ToString::to_string)
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|host| host.to_str().ok())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| state.listen().to_string());

    Ok(format!("http://{host}{}{name}", state.public_path()))
}

/// A request whose form could not be read is only told so once the secret
/// read up to that point checks out.
fn hide_unless_authorized(
    state: &AppState,
    secret: Option<&str>,
    err: ApiErrorKind,
) -> ApiErrorKind {
    if state.auth().verify(secret) {
        err
    } else {
        warn!("[upload] rejected unreadable upload without a valid secret: {err}");
        ApiErrorKind::NotFound
    }
}

fn multipart_error(err: &MultipartError, max_size: u64) -> ApiErrorKind {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiErrorKind::PayloadTooLarge(max_size)
    } else {
        ApiErrorKind::MultipartError(err.body_text())
    }
}
