//! HTTP fetcher: retry/backoff, optional robots.txt enforcement.
//!
//! Grounded on the teacher's `ReliableHttpClient` (retry/backoff shape) and
//! `RobotsManager` (per-host robots.txt caching), collapsed into a single
//! `Fetcher` matching the `fetch(Request) -> Response | null` contract.

mod robots;
mod retry;

pub use retry::RetryConfig;
pub use robots::{RobotsConfig, RobotsGuard};

use crawler_types::{Request, Response};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Executes one logical fetch, following the retry/backoff and robots
/// policy documented in the spider-facing contract. Returns `Ok(None)` on
/// any permanent failure (non-retryable status, exhausted retries,
/// robots-disallowed) — never an `Err` for those cases, since a permanent
/// failure is a normal outcome, not an exceptional one.
pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryConfig,
    robots: Option<RobotsGuard>,
    user_agent: String,
}

impl Fetcher {
    pub fn new(user_agent: impl Into<String>, retry: RetryConfig) -> anyhow::Result<Self> {
        Self::with_timeout(user_agent, retry, Duration::from_secs(10), Duration::from_secs(30))
    }

    /// Same as `new`, but with caller-chosen connect/total timeouts instead
    /// of the production defaults (10s/30s). Exists so tests can exercise
    /// the timeout path without waiting on it.
    pub fn with_timeout(
        user_agent: impl Into<String>,
        retry: RetryConfig,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let user_agent = user_agent.into();
        let client = reqwest::Client::builder()
            .user_agent(user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            retry,
            robots: None,
            user_agent,
        })
    }

    pub fn with_robots(mut self, config: RobotsConfig) -> Self {
        self.robots = Some(RobotsGuard::new(config, self.client.clone(), self.user_agent.clone()));
        self
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn fetch(&self, request: &Request) -> anyhow::Result<Option<Response>> {
        if let Some(robots) = &self.robots {
            if !robots.is_allowed(&request.url).await {
                debug!("robots.txt disallows fetch");
                return Ok(None);
            }
        }

        let mut attempt: u32 = 0;
        loop {
            let started = Instant::now();
            let outcome = self.try_once(request).await;
            let elapsed = started.elapsed();

            match outcome {
                Ok(response) if response.is_success() || !is_retryable(response.status) => {
                    if !response.is_success() {
                        debug!(status = response.status, "non-retryable status, returning null");
                        crawler_types::metrics().fetch_duration_seconds.with_label_values(&["failed"]).observe(elapsed.as_secs_f64());
                        return Ok(None);
                    }
                    debug!(status = response.status, elapsed_ms = elapsed.as_millis() as u64, "fetch succeeded");
                    crawler_types::metrics().fetch_duration_seconds.with_label_values(&["success"]).observe(elapsed.as_secs_f64());
                    return Ok(Some(response));
                }
                Ok(response) => {
                    if attempt >= self.retry.max_retries {
                        warn!(status = response.status, attempt, "retries exhausted");
                        crawler_types::metrics().fetch_duration_seconds.with_label_values(&["failed"]).observe(elapsed.as_secs_f64());
                        return Ok(None);
                    }
                    let delay = response
                        .header("retry-after")
                        .and_then(parse_retry_after)
                        .unwrap_or_else(|| self.retry.delay_for(attempt));
                    debug!(status = response.status, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(_) if attempt >= self.retry.max_retries => {
                    warn!(attempt, "network error, retries exhausted");
                    crawler_types::metrics().fetch_duration_seconds.with_label_values(&["failed"]).observe(elapsed.as_secs_f64());
                    return Ok(None);
                }
                Err(err) => {
                    let delay = self.retry.delay_for(attempt);
                    debug!(%err, attempt, delay_ms = delay.as_millis() as u64, "network error, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn try_once(&self, request: &Request) -> Result<Response, FetchError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let method = reqwest::Method::try_from(request.method.as_str()).unwrap_or(reqwest::Method::GET);
        let mut builder = self.client.request(method, url);
        // Client already carries the default user-agent header; per-request
        // headers (site config defaults merged in by the spider) are applied
        // last here and win on key collision.
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let http_response = builder.send().await?;
        let final_url = http_response.url().to_string();
        let status = http_response.status().as_u16();
        let headers = http_response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = http_response.bytes().await?.to_vec();

        Ok(Response {
            request: request.clone(),
            final_url,
            status,
            body,
            headers,
            elapsed: None,
        })
    }
}

fn is_retryable(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn retries_on_429_then_succeeds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new("test-agent", fast_retry()).unwrap();
        let request = Request::get(format!("{}/feed", mock_server.uri()));
        let response = fetcher.fetch(&request).await.unwrap().expect("should eventually succeed");

        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn follows_redirect_to_final_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/redirect"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", format!("{}/dest", mock_server.uri())))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("landed"))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new("test-agent", fast_retry()).unwrap();
        let request = Request::get(format!("{}/redirect", mock_server.uri()));
        let response = fetcher.fetch(&request).await.unwrap().expect("redirect should resolve");

        assert!(response.final_url.ends_with("/dest"));
        assert_eq!(response.text(), "landed");
    }

    #[tokio::test]
    async fn returns_none_once_retries_exhaust_on_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_string("too slow").set_delay(Duration::from_millis(300)))
            .mount(&mock_server)
            .await;

        let retry = RetryConfig {
            max_retries: 0,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(10),
        };
        let fetcher = Fetcher::with_timeout("test-agent", retry, Duration::from_millis(50), Duration::from_millis(50)).unwrap();
        let request = Request::get(format!("{}/slow", mock_server.uri()));
        let response = fetcher.fetch(&request).await.unwrap();

        assert!(response.is_none());
    }
}
