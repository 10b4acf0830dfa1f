use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Renders the process-wide Prometheus registry in text exposition format.
/// Grounded on `riptide-api/src/handlers.rs::metrics` (gather + encode,
/// logging and a 500 on encode failure rather than panicking).
pub async fn metrics() -> impl IntoResponse {
    match crawler_types::metrics().render() {
        Ok(body) => (StatusCode::OK, [("Content-Type", "text/plain; version=0.0.4")], body).into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
