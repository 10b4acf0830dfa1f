//! spec §8 scenario 3 ("Partial feed failure"): an entry missing both link
//! and title is skipped without aborting the run; the other entries are
//! still stored.

use crawler_engine::CrawlerEngine;
use crawler_fetch::{Fetcher, RetryConfig};
use crawler_integration_tests::fakes::{FakeContentRepository, FakeObjectStore};
use crawler_integration_tests::fixtures::site_config;
use crawler_render::{NoopRenderer, Renderer};
use crawler_spider::{RssSpider, Spider};
use crawler_storage::StoragePipeline;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_WITH_ORPHAN_ENTRY: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Feed</title>
<item><title>Entry One</title><link>https://example.com/1</link><description>Body 1</description></item>
<item><title>Entry Two</title><link>https://example.com/2</link><description>Body 2</description></item>
<item><title>Entry Three</title><link>https://example.com/3</link><description>Body 3</description></item>
<item><description>orphan entry, no link or title</description></item>
</channel></rss>"#;

#[tokio::test]
async fn malformed_entry_is_skipped_without_aborting_the_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_WITH_ORPHAN_ENTRY))
        .mount(&mock_server)
        .await;

    let config = site_config("bbc", format!("{}/feed.xml", mock_server.uri()), None);
    let spider: Arc<dyn Spider> = Arc::new(RssSpider::new(config.source_name.clone(), config.feed_url.clone()));

    let fetcher = Arc::new(Fetcher::new("test-agent", RetryConfig::default()).unwrap());
    let renderer: Arc<dyn Renderer> = Arc::new(NoopRenderer);
    let objects = Arc::new(FakeObjectStore::default());
    let repo = Arc::new(FakeContentRepository::default());
    let pipeline = Arc::new(StoragePipeline::new(objects, repo.clone()));
    let engine = CrawlerEngine::new(fetcher, renderer, pipeline);

    let stored = engine.crawl_spider(spider, &config).await.unwrap();

    assert_eq!(stored, 3);
    assert_eq!(repo.rows.lock().unwrap().len(), 3);
}
