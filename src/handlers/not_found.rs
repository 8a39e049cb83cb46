use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ApiErrorKind, state::AppState};

/// Router fallback for every unknown route
pub(crate) async fn fallback() -> ApiErrorKind {
    ApiErrorKind::NotFound
}

/// Replaces the body of every 404 response with the configured page.
pub(crate) async fn custom_not_found(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    match (response.status(), state.not_found_page()) {
        (StatusCode::NOT_FOUND, Some(page)) => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            page.clone(),
        )
            .into_response(),
        _ => response,
    }
}
