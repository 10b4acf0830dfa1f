use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Records one `http_requests_total` observation per handled request.
/// Grounded on `riptide-api/src/middleware/request_validation.rs`'s
/// `axum::middleware::from_fn` shape.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    crawler_types::metrics().http_requests_total.with_label_values(&[&method, &path, &status]).inc();

    response
}
