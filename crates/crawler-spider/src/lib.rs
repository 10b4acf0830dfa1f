//! Spider contract and the RSS spider implementation.
//!
//! Grounded on `riptide-spider::builder` for the trait-object spider shape,
//! and on `original_source/crawlers/spiders/rss_spider.py` for the exact
//! RSS-specific semantics: content precedence, the `< 500` char follow-up
//! threshold, and `feed_title`/`feed_link` metadata enrichment.

mod rss;

pub use rss::RssSpider;

use crawler_types::{Item, Request, Response};
use thiserror::Error;

/// A single malformed entry within an otherwise-valid response. Logged and
/// skipped by the engine; never aborts the whole crawl.
#[derive(Debug, Error)]
#[error("parse error: {0}")]
pub struct ParseError(pub String);

pub type ParseOutcome = Result<(Vec<Item>, Vec<Request>), ParseError>;

/// Site-specific translation from responses to items and follow-up
/// requests. Implementations must be deterministic in `seeds()`.
pub trait Spider: Send + Sync {
    fn name(&self) -> &str;

    /// Initial requests. Must be deterministic and finite.
    fn seeds(&self) -> Vec<Request>;

    /// Translate one response into items and follow-up requests.
    fn parse(&self, response: &Response) -> ParseOutcome;

    /// Used when a follow-up request is tagged `fetch_full`. The default
    /// implementation means "not supported" by yielding nothing; spiders
    /// that want full-content follow-ups override this.
    fn parse_full_content(&self, _response: &Response) -> ParseOutcome {
        Ok((Vec::new(), Vec::new()))
    }

    /// Whether this spider implements `parse_full_content` meaningfully.
    fn supports_full_content(&self) -> bool {
        false
    }
}
