//! spec §8 scenario 5 ("Retry on 429"): fetcher stubbed to return 429 then
//! 200. Expect 2 attempts, an inter-attempt sleep of at least 1s (the
//! default `RetryConfig` base delay), and a final 200 response.

use crawler_fetch::{Fetcher, RetryConfig};
use crawler_types::Request;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn retry_after_429_sleeps_at_least_a_second_then_succeeds() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new("test-agent", RetryConfig::default()).unwrap();
    let request = Request::get(format!("{}/feed.xml", mock_server.uri()));

    let started = Instant::now();
    let response = fetcher.fetch(&request).await.unwrap().expect("should succeed after one retry");
    let elapsed = started.elapsed();

    assert_eq!(response.status, 200);
    assert!(elapsed >= Duration::from_secs(1), "elapsed {elapsed:?} should reflect the 1s base retry delay");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}
