//! spec §8 scenarios 1 ("Fresh RSS crawl") and 2 ("Duplicate second run"),
//! plus the cross-store invariants (dedup, uuid-embedded body_ref, object
//! existence) those scenarios exist to pin down.

use crawler_engine::CrawlerEngine;
use crawler_fetch::{Fetcher, RetryConfig};
use crawler_integration_tests::fakes::{FakeContentRepository, FakeObjectStore};
use crawler_integration_tests::fixtures::{feed_xml, site_config};
use crawler_render::{NoopRenderer, Renderer};
use crawler_spider::{RssSpider, Spider};
use crawler_storage::StoragePipeline;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    engine: CrawlerEngine,
    objects: Arc<FakeObjectStore>,
    repo: Arc<FakeContentRepository>,
}

fn harness() -> Harness {
    let fetcher = Arc::new(Fetcher::new("test-agent", RetryConfig::default()).unwrap());
    let renderer: Arc<dyn Renderer> = Arc::new(NoopRenderer);
    let objects = Arc::new(FakeObjectStore::default());
    let repo = Arc::new(FakeContentRepository::default());
    let pipeline = Arc::new(StoragePipeline::new(objects.clone(), repo.clone()));
    Harness {
        engine: CrawlerEngine::new(fetcher, renderer, pipeline),
        objects,
        repo,
    }
}

#[tokio::test]
async fn fresh_crawl_stores_five_rows_and_five_objects() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_xml(5)))
        .mount(&mock_server)
        .await;

    let config = site_config("bbc", format!("{}/feed.xml", mock_server.uri()), Some(5));
    let spider: Arc<dyn Spider> =
        Arc::new(RssSpider::new(config.source_name.clone(), config.feed_url.clone()).with_max_items(config.max_items));

    let harness = harness();
    let stored = harness.engine.crawl_spider(spider, &config).await.unwrap();

    assert_eq!(stored, 5);
    let rows = harness.repo.rows.lock().unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.source == "bbc"));

    let objects = harness.objects.objects.lock().unwrap();
    assert_eq!(objects.len(), 5);
    for row in rows.iter() {
        assert!(row.body_ref.contains(&row.content_uuid.to_string()));
        let expected_ref = format!("bbc/{}.txt", row.content_uuid);
        assert_eq!(row.body_ref, expected_ref);
        assert!(objects.contains_key(&expected_ref));
    }
}

#[tokio::test]
async fn duplicate_second_run_stores_nothing_new() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_xml(5)))
        .mount(&mock_server)
        .await;

    let config = site_config("bbc", format!("{}/feed.xml", mock_server.uri()), Some(5));
    let build_spider = || -> Arc<dyn Spider> {
        Arc::new(RssSpider::new(config.source_name.clone(), config.feed_url.clone()).with_max_items(config.max_items))
    };

    let harness = harness();
    let first = harness.engine.crawl_spider(build_spider(), &config).await.unwrap();
    assert_eq!(first, 5);

    let second = harness.engine.crawl_spider(build_spider(), &config).await.unwrap();

    assert_eq!(second, 0);
    assert_eq!(harness.repo.rows.lock().unwrap().len(), 5);
    assert_eq!(harness.objects.objects.lock().unwrap().len(), 5);
}
