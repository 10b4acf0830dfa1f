use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value record describing one HTTP call to make. Constructed by spiders
/// and never mutated after construction; a follow-up request is a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<Vec<u8>>,
    #[serde(default)]
    pub use_render: bool,
    /// Spider-private hints such as `is_feed`, `fetch_full`, `source`.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: HashMap::new(),
            body: None,
            use_render: false,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_render(mut self, use_render: bool) -> Self {
        self.use_render = use_render;
        self
    }

    /// Spider-private hint read back after a round trip through the fetcher.
    pub fn meta_bool(&self, key: &str) -> bool {
        self.metadata.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// A value record describing the outcome of one HTTP call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub request: Request,
    pub final_url: String,
    pub status: u16,
    pub body: Vec<u8>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub elapsed: Option<std::time::Duration>,
}

impl Response {
    /// Body decoded as UTF-8 with replacement for invalid byte sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Normalized crawled record, the only artifact a spider produces for
/// persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Canonical URL, used as the dedup key.
    pub url: String,
    pub title: String,
    /// Cleaned plain text.
    pub body: String,
    /// Matches the site config key.
    pub source: String,
    pub author: Option<String>,
    /// Timezone-aware; UTC if the source was ambiguous.
    pub published_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Item {
    pub fn new(url: impl Into<String>, source: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            body: body.into(),
            source: source.into(),
            author: None,
            published_at: None,
            language: None,
            metadata: HashMap::new(),
        }
    }
}
