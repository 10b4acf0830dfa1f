//! Per-site crawl orchestration: seed -> bounded-concurrency drain ->
//! single batched pipeline write.
//!
//! Grounded on `riptide-engine` (resource lifecycle / `close()` pattern)
//! and `riptide-pipeline` (queue-drain-then-persist shape); bounded-inflight
//! worker pool mirrors the semaphore-gated pattern `riptide-pool` uses for
//! its instance pool.

use crawler_antibot::AntiBot;
use crawler_fetch::Fetcher;
use crawler_render::Renderer;
use crawler_spider::Spider;
use crawler_storage::StoragePipeline;
use crawler_types::{Item, Request, Response, SiteConfig};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, instrument, warn};

pub struct CrawlerEngine {
    fetcher: Arc<Fetcher>,
    renderer: Arc<dyn Renderer>,
    pipeline: Arc<StoragePipeline>,
}

impl CrawlerEngine {
    pub fn new(fetcher: Arc<Fetcher>, renderer: Arc<dyn Renderer>, pipeline: Arc<StoragePipeline>) -> Self {
        Self {
            fetcher,
            renderer,
            pipeline,
        }
    }

    /// Runs one site's crawl end-to-end, returning the count of newly
    /// stored items. Item/follow-up ordering is not guaranteed; inflight
    /// fetches are bounded to `config.concurrency`. Once the queue drains
    /// and no fetch remains inflight, the accumulated batch is handed to
    /// the storage pipeline exactly once.
    #[instrument(skip(self, spider, config), fields(site = %spider.name()))]
    pub async fn crawl_spider(&self, spider: Arc<dyn Spider>, config: &SiteConfig) -> anyhow::Result<usize> {
        let antibot = Arc::new(AntiBot::new(config.qps, config.delay, config.jitter));
        let queue = Arc::new(Mutex::new(VecDeque::from(spider.seeds())));
        let items = Arc::new(Mutex::new(Vec::<Item>::new()));
        let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
        let max_items = config.max_items;
        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            loop {
                if let Some(cap) = max_items {
                    if items.lock().await.len() >= cap {
                        break;
                    }
                }
                let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                    break;
                };
                let request = queue.lock().await.pop_front();
                let Some(request) = request else {
                    drop(permit);
                    break;
                };

                let antibot = antibot.clone();
                let fetcher = self.fetcher.clone();
                let renderer = self.renderer.clone();
                let spider = spider.clone();
                let queue = queue.clone();
                let items = items.clone();
                let max_items = max_items;

                in_flight.spawn(async move {
                    let _permit = permit;
                    let Some(response) = fetch_one(&request, &antibot, &fetcher, &renderer).await else {
                        return;
                    };

                    let (parsed_items, follow_ups) = parse_response(spider.as_ref(), &request, &response);

                    let mut items_guard = items.lock().await;
                    for item in parsed_items {
                        if let Some(cap) = max_items {
                            if items_guard.len() >= cap {
                                break;
                            }
                        }
                        items_guard.push(item);
                    }
                    drop(items_guard);

                    let mut queue_guard = queue.lock().await;
                    queue_guard.extend(follow_ups);
                });
            }

            if in_flight.is_empty() {
                let cap_reached = max_items.is_some_and(|cap| items.lock().await.len() >= cap);
                if cap_reached || queue.lock().await.is_empty() {
                    break;
                }
                tokio::task::yield_now().await;
                continue;
            }

            in_flight.join_next().await;
        }

        let batch = Arc::try_unwrap(items).map(Mutex::into_inner).unwrap_or_default();
        debug!(count = batch.len(), "crawl drained, handing batch to storage pipeline");
        let stored = self.pipeline.process_items(&batch).await?;
        Ok(stored)
    }

    /// Releases fetcher/renderer resources. Does not hard-cancel inflight
    /// operations — callers should await `crawl_spider` completion first.
    pub async fn close(&self) {
        self.renderer.close().await;
    }
}

async fn fetch_one(
    request: &Request,
    antibot: &AntiBot,
    fetcher: &Fetcher,
    renderer: &Arc<dyn Renderer>,
) -> Option<Response> {
    antibot.before_request().await;

    let response = if request.use_render {
        match renderer.render(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(%err, url = %request.url, "renderer error");
                None
            }
        }
    } else {
        match fetcher.fetch(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(%err, url = %request.url, "fetcher error");
                None
            }
        }
    };

    antibot.after_request().await;
    response
}

fn parse_response(spider: &dyn Spider, request: &Request, response: &Response) -> (Vec<Item>, Vec<Request>) {
    let use_full_content = request.meta_bool("fetch_full") && spider.supports_full_content();
    let result = if use_full_content {
        spider.parse_full_content(response)
    } else {
        spider.parse(response)
    };

    match result {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(url = %request.url, %err, "spider parse failed, skipping response");
            (Vec::new(), Vec::new())
        }
    }
}
