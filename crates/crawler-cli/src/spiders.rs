use crawler_spider::{RssSpider, Spider};
use crawler_types::SiteConfig;
use std::sync::Arc;

/// Builds the spider implementation named by `config.spider`. Only `"rss"`
/// is implemented; unknown kinds are a startup-time config error.
pub fn build(config: &SiteConfig) -> anyhow::Result<Arc<dyn Spider>> {
    match config.spider.as_str() {
        "rss" => {
            let spider = RssSpider::new(config.source_name.clone(), config.feed_url.clone())
                .with_fetch_full_content(config.fetch_full_content)
                .with_max_items(config.max_items)
                .with_default_headers(config.headers.clone())
                .with_render(config.use_render);
            Ok(Arc::new(spider))
        }
        other => anyhow::bail!("unknown spider kind: {other}"),
    }
}
