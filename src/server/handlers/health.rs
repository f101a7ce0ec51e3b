//! Health check endpoint.

use axum::http::StatusCode;
use axum::response::IntoResponse;

pub async fn health_handler() -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, axum::Json(body))
}
