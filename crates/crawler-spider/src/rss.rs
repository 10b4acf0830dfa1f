use crate::{ParseError, ParseOutcome, Spider};
use crawler_types::{Item, Request, Response};
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

/// RSS/Atom/JSON-feed spider. One seed (the feed URL); each entry becomes
/// an `Item`, with an optional follow-up fetch of the full article when the
/// feed-supplied body is too short to be useful.
pub struct RssSpider {
    source_name: String,
    feed_url: String,
    fetch_full_content: bool,
    max_items: Option<usize>,
    default_headers: HashMap<String, String>,
    use_render: bool,
}

const FULL_CONTENT_THRESHOLD: usize = 500;

impl RssSpider {
    pub fn new(source_name: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            feed_url: feed_url.into(),
            fetch_full_content: false,
            max_items: None,
            default_headers: HashMap::new(),
            use_render: false,
        }
    }

    pub fn with_fetch_full_content(mut self, fetch_full_content: bool) -> Self {
        self.fetch_full_content = fetch_full_content;
        self
    }

    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    /// Default headers applied to every request this spider builds (feed
    /// fetch and follow-ups alike). Per-request headers set later still win.
    pub fn with_default_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn with_render(mut self, use_render: bool) -> Self {
        self.use_render = use_render;
        self
    }

    fn request(&self, url: impl Into<String>) -> Request {
        Request::get(url).with_headers(self.default_headers.clone()).with_render(self.use_render)
    }
}

impl Spider for RssSpider {
    fn name(&self) -> &str {
        &self.source_name
    }

    fn seeds(&self) -> Vec<Request> {
        vec![self
            .request(&self.feed_url)
            .with_metadata("is_feed", json!(true))
            .with_metadata("source", json!(self.source_name.clone()))]
    }

    fn parse(&self, response: &Response) -> ParseOutcome {
        let feed = feed_rs::parser::parse(response.body.as_slice())
            .map_err(|err| ParseError(format!("malformed feed: {err}")))?;

        let feed_title = feed.title.as_ref().map(|t| t.content.clone());
        let feed_link = feed.links.first().map(|l| l.href.clone());

        let mut items = Vec::new();
        let mut follow_ups = Vec::new();

        for entry in feed.entries {
            if let Some(cap) = self.max_items {
                if items.len() >= cap {
                    break;
                }
            }

            let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
                warn!(source = %self.source_name, entry_id = %entry.id, "entry missing link, skipping");
                continue;
            };
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.clone())
                .unwrap_or_else(|| "No title".to_string());

            let body = entry
                .content
                .as_ref()
                .and_then(|c| c.body.clone())
                .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))
                .unwrap_or_default();
            let cleaned_body = crawler_parse::clean_text(&body);

            let author = entry.authors.first().map(|p| p.name.clone());
            let published_at = entry.published.or(entry.updated);

            let mut item = Item::new(link.clone(), self.source_name.clone(), title, cleaned_body.clone());
            item.author = author;
            item.published_at = published_at;
            if let Some(ref feed_title) = feed_title {
                item.metadata.insert("feed_title".to_string(), json!(feed_title));
            }
            if let Some(ref feed_link) = feed_link {
                item.metadata.insert("feed_link".to_string(), json!(feed_link));
            }

            if self.fetch_full_content && cleaned_body.len() < FULL_CONTENT_THRESHOLD {
                follow_ups.push(self.request(&link).with_metadata("fetch_full", json!(true)));
            }

            items.push(item);
        }

        Ok((items, follow_ups))
    }

    fn parse_full_content(&self, response: &Response) -> ParseOutcome {
        let html = response.text();
        let title = crawler_parse::extract_text(&html, Some("h1"), None).unwrap_or_else(|| "No title".to_string());
        let body = crawler_parse::clean_text(&html);

        let mut item = Item::new(response.final_url.clone(), self.source_name.clone(), title, body);
        item.metadata.insert("fetched_full".to_string(), json!(true));

        Ok((vec![item], Vec::new()))
    }

    fn supports_full_content(&self) -> bool {
        true
    }
}
