use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Robots.txt enforcement configuration. TTL defaults to 24h (spec's
/// suggested conservative default — the teacher's `RobotsConfig` used 1h,
/// tuned for a different, lower-latency workload; see DESIGN.md).
#[derive(Debug, Clone)]
pub struct RobotsConfig {
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 3600),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

struct CachedRobots {
    body: String,
    cached_at: Instant,
}

impl CachedRobots {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Per-host cached robots.txt lookups, lazily fetched.
pub struct RobotsGuard {
    config: RobotsConfig,
    client: reqwest::Client,
    user_agent: String,
    cache: DashMap<String, CachedRobots>,
}

impl RobotsGuard {
    pub fn new(config: RobotsConfig, client: reqwest::Client, user_agent: String) -> Self {
        Self {
            config,
            client,
            user_agent,
            cache: DashMap::new(),
        }
    }

    pub async fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };
        let Some(host) = parsed.host_str() else {
            return true;
        };
        let robots_url = format!("{}://{}/robots.txt", parsed.scheme(), host);
        let body = self.get_or_fetch(host, &robots_url).await;

        let mut matcher = robotstxt::DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&body, &self.user_agent, url)
    }

    async fn get_or_fetch(&self, host: &str, robots_url: &str) -> String {
        if let Some(cached) = self.cache.get(host) {
            if !cached.is_expired(self.config.cache_ttl) {
                return cached.body.clone();
            }
        }

        let body = match tokio::time::timeout(self.config.fetch_timeout, self.client.get(robots_url).send()).await {
            Ok(Ok(resp)) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            Ok(Ok(resp)) => {
                debug!(status = %resp.status(), robots_url, "robots.txt fetch non-2xx, treating as permissive");
                String::new()
            }
            Ok(Err(err)) => {
                warn!(%err, robots_url, "robots.txt fetch failed, treating as permissive");
                String::new()
            }
            Err(_) => {
                warn!(robots_url, "robots.txt fetch timed out, treating as permissive");
                String::new()
            }
        };

        self.cache.insert(
            host.to_string(),
            CachedRobots {
                body: body.clone(),
                cached_at: Instant::now(),
            },
        );
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_24_hours() {
        assert_eq!(RobotsConfig::default().cache_ttl, Duration::from_secs(86_400));
    }
}
