use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    context::ServerRuntimeContext,
    error::{AppResult, ErrorKind},
    handlers::{
        files::{redirect_to_public_path, serve_path},
        health::{init_start_time, live_check},
        not_found::{custom_not_found, fallback},
        upload::upload_file,
    },
    log::log_request,
    state::AppState,
    storage::Storage,
};

/// Route of the upload endpoint
pub const UPLOAD_PATH: &str = "/upload";

/// Route of the liveness probe
pub const LIVE_PATH: &str = "/health/live";

/// Build the routing structure for `state`
pub fn build_router(state: AppState, request_log: bool) -> Router {
    let public_path = state.public_path().to_string();

    let mut app = Router::new()
        .route(
            UPLOAD_PATH,
            post(upload_file).layer(DefaultBodyLimit::max(state.max_body_bytes())),
        )
        .route(LIVE_PATH, get(live_check))
        .route(&public_path, get(serve_path))
        .route(&format!("{public_path}*path"), get(serve_path));

    // `/!` is redirected to `/!/`
    let bare_public_path = public_path.trim_end_matches('/');
    if !bare_public_path.is_empty() {
        app = app.route(bare_public_path, get(redirect_to_public_path));
    }

    app = app.fallback(fallback);

    if state.not_found_page().is_some() {
        app = app.layer(middleware::from_fn_with_state(
            state.clone(),
            custom_not_found,
        ));
    }

    if request_log {
        app = app.layer(middleware::from_fn(log_request));
    }

    app.with_state(state)
}

pub async fn start_web_server<S>(runtime_ctx: ServerRuntimeContext<S>) -> AppResult<()>
where
    S: Storage + Clone,
{
    init_start_time();

    let socket_address = runtime_ctx.socket_address;
    let app = build_router(runtime_ctx.app_state(), runtime_ctx.request_log);

    info!("Starting web server ...");

    let listener = TcpListener::bind(socket_address).await.map_err(|err| {
        ErrorKind::WebServer.context(format!("Could not bind to `{socket_address}`: {err}"))
    })?;

    let local_address = listener.local_addr()?;
    info!("Listening on: `http://{local_address}`");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|err| ErrorKind::WebServer.context(err))?;

    Ok(())
}
