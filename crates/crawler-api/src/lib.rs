//! Thin management HTTP surface over the scheduler and content store.
//!
//! Grounded on `riptide-api`'s handler/dto/state layering (`errors.rs`,
//! `state.rs`, `handlers/*`), trimmed to the one route tree this spec
//! names; status-code choices (404/409/400) follow
//! `original_source/app/api/v1/crawlers.py` exactly.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/crawlers/sites", get(handlers::sites::list_sites))
        .route("/crawlers/sites/:name", get(handlers::sites::get_site))
        .route("/crawlers/sites/:name/status", get(handlers::sites::site_status))
        .route("/crawlers/sites/:name/crawl", post(handlers::sites::trigger_crawl))
        .route("/crawlers/sites/batch-crawl", post(handlers::sites::batch_crawl))
        .route("/jobs/", get(handlers::jobs::list_jobs))
        .route("/jobs/:id", get(handlers::jobs::get_job))
        .route("/contents/", get(handlers::contents::list_contents).post(handlers::contents::create_content))
        .route("/contents/:id", get(handlers::contents::get_content))
        .route("/metrics", get(handlers::metrics::metrics))
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
