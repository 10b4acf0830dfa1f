//! Rendering fallback for JavaScript-heavy pages.
//!
//! Only `NoopRenderer` is implemented here: resources (a real headless
//! browser context) are lazily started on first call and explicitly closed
//! at engine shutdown, per the contract, but no CDP driver is wired in —
//! there is no browser binary to drive in this environment. A real
//! implementation plugs in behind the same trait.

use async_trait::async_trait;
use crawler_types::{Request, Response};
use tracing::debug;

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a request through a real or simulated browser context.
    /// Returns `Ok(None)` when rendering is unavailable or fails.
    async fn render(&self, request: &Request) -> anyhow::Result<Option<Response>>;

    /// Release any resources (browser/context) held by this renderer.
    async fn close(&self);
}

/// Default renderer: returns `None` unconditionally. Used when no browser
/// is available, or when render fallback simply isn't configured.
#[derive(Debug, Default)]
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, request: &Request) -> anyhow::Result<Option<Response>> {
        debug!(url = %request.url, "no-op renderer invoked, returning null");
        Ok(None)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_renderer_always_returns_none() {
        let renderer = NoopRenderer;
        let request = Request::get("https://example.com").with_render(true);
        let result = renderer.render(&request).await.unwrap();
        assert!(result.is_none());
        renderer.close().await;
    }
}
