use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the site configuration file, keyed by site name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Spider kind. Currently only `"rss"` is implemented.
    #[serde(default = "default_spider")]
    pub spider: String,
    /// Defaults to the site's map key if omitted; filled in by the loader.
    #[serde(default)]
    pub source_name: String,
    pub feed_url: String,
    /// 5-field cron expression (minute hour day-of-month month day-of-week), UTC.
    pub cron: String,
    /// Requests-per-second ceiling. `None` disables rate limiting.
    #[serde(default)]
    pub qps: Option<f64>,
    /// Max inflight fetches for one engine run.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Cap on items emitted per run.
    #[serde(default)]
    pub max_items: Option<usize>,
    #[serde(default)]
    pub fetch_full_content: bool,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub use_render: bool,
    /// Anti-bot post-acquire delay, seconds.
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub jitter: bool,
}

fn default_spider() -> String {
    "rss".to_string()
}

fn default_concurrency() -> usize {
    2
}

/// Site config file: a keyed mapping of site name to config record.
pub type SiteConfigMap = HashMap<String, SiteConfig>;

/// Load a site config file, filling in `source_name` from the map key where
/// the file left it blank.
pub fn normalize(mut configs: SiteConfigMap) -> SiteConfigMap {
    for (name, cfg) in configs.iter_mut() {
        if cfg.source_name.is_empty() {
            cfg.source_name = name.clone();
        }
    }
    configs
}
