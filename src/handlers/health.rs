use std::{sync::OnceLock, time::Instant};

use axum::{http::StatusCode, response::IntoResponse};
use axum_extra::json;

// Global that stores the current when the server started
// This is used to check if the server is running
pub static START_TIME: OnceLock<Instant> = OnceLock::new();

pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

/// live_check
/// Interface: GET /health/live
pub async fn live_check() -> impl IntoResponse {
    let uptime = START_TIME
        .get()
        .map_or(0, |start| Instant::now().duration_since(*start).as_secs());

    (
        StatusCode::OK,
        json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": uptime,
            "timestamp": chrono::Local::now().timestamp(),
        }),
    )
        .into_response()
}
