use crawler_types::SiteConfig;

/// Builds an RSS 2.0 feed body with `n` distinct, fully-populated entries.
pub fn feed_xml(n: usize) -> String {
    let items: String = (1..=n)
        .map(|i| format!("<item><title>Entry {i}</title><link>https://example.com/{i}</link><description>Body {i}</description></item>"))
        .collect();
    format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Feed</title>{items}</channel></rss>"#)
}

/// A minimal, fully-specified site config for scenario tests. `cron` is
/// unused by direct `crawl_spider` calls but required by the type.
pub fn site_config(source_name: &str, feed_url: String, max_items: Option<usize>) -> SiteConfig {
    SiteConfig {
        spider: "rss".to_string(),
        source_name: source_name.to_string(),
        feed_url,
        cron: "0 * * * *".to_string(),
        qps: None,
        concurrency: 4,
        max_items,
        fetch_full_content: false,
        headers: Default::default(),
        use_render: false,
        delay: 0.0,
        jitter: false,
    }
}
