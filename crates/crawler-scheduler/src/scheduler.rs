use crate::error::SchedulerError;
use crate::job::{JobRun, JobStatus, ScheduledJob};
use chrono::Utc;
use crawler_engine::CrawlerEngine;
use crawler_spider::Spider;
use crawler_types::SiteConfig;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// One registered site: its spider implementation plus the config driving
/// concurrency, QPS, and full-content behavior.
pub struct SiteEntry {
    pub spider: Arc<dyn Spider>,
    pub config: SiteConfig,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the scheduler loop polls for due jobs.
    pub check_interval: Duration,
    /// How many recent runs to retain per job id.
    pub max_runs_per_job: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            max_runs_per_job: 20,
        }
    }
}

/// Cron/one-shot dispatcher for per-site crawl runs. Wraps every job
/// execution so `is_running` reflects the window between dispatch and
/// completion, preventing concurrent runs of the same site.
pub struct Scheduler {
    config: SchedulerConfig,
    engine: Arc<CrawlerEngine>,
    sites: HashMap<String, SiteEntry>,
    jobs: Arc<DashMap<String, ScheduledJob>>,
    running: Arc<DashMap<String, bool>>,
    runs: Arc<DashMap<String, Vec<JobRun>>>,
    shutdown: Arc<AtomicBool>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(engine: Arc<CrawlerEngine>, sites: HashMap<String, SiteEntry>, config: SchedulerConfig) -> Self {
        Self {
            config,
            engine,
            sites,
            jobs: Arc::new(DashMap::new()),
            running: Arc::new(DashMap::new()),
            runs: Arc::new(DashMap::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
            loop_handle: Mutex::new(None),
        }
    }

    /// Registers every configured site on a cron trigger, using each
    /// site's `cron` field when present. Sites without a `cron` expression
    /// are registered but will only ever run via `trigger_manual_crawl`.
    pub fn bootstrap_from_sites(&self) -> anyhow::Result<()> {
        for (name, entry) in &self.sites {
            let job = ScheduledJob::new_cron(format!("crawl_{name}"), name.clone(), entry.config.cron.clone())?;
            self.jobs.insert(job.id.clone(), job);
        }
        Ok(())
    }

    /// Starts the polling loop as a background task. Idempotent: calling
    /// `start` while already running is a no-op.
    pub async fn start(self: &Arc<Self>) {
        let mut guard = self.loop_handle.lock().await;
        if guard.is_some() {
            warn!("scheduler already started");
            return;
        }

        self.shutdown.store(false, Ordering::SeqCst);
        let scheduler = self.clone();
        *guard = Some(tokio::spawn(async move {
            scheduler.run_loop().await;
        }));
        info!("scheduler started");
    }

    pub async fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.loop_handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("scheduler stopped");
    }

    async fn run_loop(self: Arc<Self>) {
        while !self.shutdown.load(Ordering::SeqCst) {
            let due: Vec<String> = self
                .jobs
                .iter()
                .filter(|entry| entry.value().is_due(Utc::now()))
                .map(|entry| entry.key().clone())
                .collect();

            for job_id in due {
                self.dispatch(&job_id).await;
            }

            tokio::time::sleep(self.config.check_interval).await;
        }
    }

    async fn dispatch(self: &Arc<Self>, job_id: &str) {
        let site = {
            let Some(mut job) = self.jobs.get_mut(job_id) else {
                return;
            };
            let site = job.site.clone();
            if let Err(err) = job.advance() {
                error!(%job_id, %err, "failed to recompute next run, disabling job");
                job.next_run = None;
            }
            site
        };

        if self.jobs.get(job_id).map(|j| j.is_exhausted()).unwrap_or(false) {
            self.jobs.remove(job_id);
        }

        let scheduler = self.clone();
        let job_id = job_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = scheduler.run_job(&job_id, &site).await {
                error!(%job_id, %site, %err, "scheduled job dispatch failed");
            }
        });
    }

    /// Runs one job to completion, recording its run and clearing the
    /// running flag on every exit path (success, crawl error, or site
    /// lookup failure).
    #[instrument(skip(self), fields(job_id = %job_id, site = %site))]
    async fn run_job(&self, job_id: &str, site: &str) -> Result<(), SchedulerError> {
        if self.is_running(job_id) {
            return Err(SchedulerError::AlreadyRunning(job_id.to_string()));
        }

        let entry = self.sites.get(site).ok_or_else(|| SchedulerError::SiteNotFound(site.to_string()))?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut run = JobRun::pending(run_id.clone(), job_id.to_string(), site.to_string());

        self.running.insert(job_id.to_string(), true);
        run.status = JobStatus::Running;
        self.record_run(job_id, run.clone());

        let result = self.engine.crawl_spider(entry.spider.clone(), &entry.config).await;

        run.end_time = Some(Utc::now());
        match result {
            Ok(stored) => {
                run.status = JobStatus::Succeeded;
                run.items_stored = Some(stored);
                debug!(job_id, site, stored, "scheduled crawl completed");
            }
            Err(err) => {
                run.status = JobStatus::Failed;
                run.error = Some(err.to_string());
                warn!(job_id, site, %err, "scheduled crawl failed");
            }
        }
        self.record_run(job_id, run);
        self.running.insert(job_id.to_string(), false);

        Ok(())
    }

    fn record_run(&self, job_id: &str, run: JobRun) {
        let mut entry = self.runs.entry(job_id.to_string()).or_default();
        entry.retain(|r| r.run_id != run.run_id);
        entry.push(run);
        if entry.len() > self.config.max_runs_per_job {
            let overflow = entry.len() - self.config.max_runs_per_job;
            entry.drain(0..overflow);
        }
    }

    pub fn add_job(&self, job: ScheduledJob) {
        info!(job_id = %job.id, site = %job.site, "adding scheduled job");
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn remove_job(&self, job_id: &str) -> bool {
        self.jobs.remove(job_id).is_some()
    }

    pub fn get_job(&self, job_id: &str) -> Option<ScheduledJob> {
        self.jobs.get(job_id).map(|entry| entry.value().clone())
    }

    pub fn get_jobs(&self) -> Vec<ScheduledJob> {
        self.jobs.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn is_running(&self, job_id: &str) -> bool {
        self.running.get(job_id).map(|flag| *flag).unwrap_or(false)
    }

    pub fn recent_runs(&self, job_id: &str) -> Vec<JobRun> {
        self.runs.get(job_id).map(|entry| entry.clone()).unwrap_or_default()
    }

    pub fn latest_run(&self, job_id: &str) -> Option<JobRun> {
        self.runs.get(job_id).and_then(|entry| entry.last().cloned())
    }

    pub fn site_names(&self) -> Vec<String> {
        self.sites.keys().cloned().collect()
    }

    pub fn site_config(&self, site: &str) -> Option<SiteConfig> {
        self.sites.get(site).map(|entry| entry.config.clone())
    }

    pub fn has_site(&self, site: &str) -> bool {
        self.sites.contains_key(site)
    }

    /// Synthesizes a one-shot date-trigger job for immediate execution.
    /// Fails if the site is unknown or a run for `crawl_<site>` is already
    /// in flight.
    pub async fn trigger_manual_crawl(self: &Arc<Self>, site: &str) -> Result<String, SchedulerError> {
        if self.loop_handle.lock().await.is_none() {
            return Err(SchedulerError::SchedulerUnavailable);
        }

        if !self.sites.contains_key(site) {
            return Err(SchedulerError::SiteNotFound(site.to_string()));
        }

        let scheduled_id = format!("crawl_{site}");
        if self.is_running(&scheduled_id) {
            return Err(SchedulerError::AlreadyRunning(scheduled_id));
        }

        let job_id = format!("manual_crawl_{site}_{}", Utc::now().timestamp());
        let job = ScheduledJob::new_date(job_id.clone(), site.to_string(), Utc::now());
        self.jobs.insert(job_id.clone(), job);

        let scheduler = self.clone();
        let dispatch_id = job_id.clone();
        let site = site.to_string();
        tokio::spawn(async move {
            if let Err(err) = scheduler.run_job(&dispatch_id, &site).await {
                error!(job_id = %dispatch_id, %err, "manual crawl failed");
            }
            scheduler.jobs.remove(&dispatch_id);
        });

        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crawler_fetch::{Fetcher, RetryConfig};
    use crawler_render::NoopRenderer;
    use crawler_storage::{ContentRepository, ObjectStore, StorageError, StoragePipeline};
    use crawler_types::{ContentRecord, Response};
    use std::collections::HashMap as StdHashMap;

    struct EmptyObjectStore;
    #[async_trait]
    impl ObjectStore for EmptyObjectStore {
        async fn put(&self, _key: &str, _body: Vec<u8>) -> anyhow::Result<()> {
            Ok(())
        }
        async fn delete(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    struct EmptyRepository;
    #[async_trait]
    impl ContentRepository for EmptyRepository {
        async fn find_by_url(&self, _url: &str) -> anyhow::Result<Option<ContentRecord>> {
            Ok(None)
        }
        async fn insert(
            &self,
            content_uuid: uuid::Uuid,
            source: &str,
            url: &str,
            title: &str,
            author: Option<&str>,
            published_at: Option<chrono::DateTime<Utc>>,
            body_ref: &str,
        ) -> Result<ContentRecord, StorageError> {
            Ok(ContentRecord {
                id: 1,
                content_uuid,
                source: source.to_string(),
                url: url.to_string(),
                title: title.to_string(),
                author: author.map(String::from),
                published_at,
                created_at: Utc::now(),
                body_ref: body_ref.to_string(),
            })
        }
        async fn find_by_id(&self, _id: i64) -> anyhow::Result<Option<ContentRecord>> {
            Ok(None)
        }
        async fn list(&self, _skip: i64, _limit: i64, _source: Option<&str>) -> anyhow::Result<Vec<ContentRecord>> {
            Ok(Vec::new())
        }
    }

    struct EmptySpider;
    impl Spider for EmptySpider {
        fn name(&self) -> &str {
            "empty"
        }
        fn seeds(&self) -> Vec<crawler_types::Request> {
            Vec::new()
        }
        fn parse(&self, _response: &Response) -> crawler_spider::ParseOutcome {
            Ok((Vec::new(), Vec::new()))
        }
    }

    fn test_site_config() -> SiteConfig {
        SiteConfig {
            spider: "rss".to_string(),
            source_name: "example".to_string(),
            feed_url: "https://example.com/feed.xml".to_string(),
            cron: "*/5 * * * *".to_string(),
            qps: None,
            concurrency: 2,
            max_items: None,
            fetch_full_content: false,
            headers: StdHashMap::new(),
            use_render: false,
            delay: 0.0,
            jitter: false,
        }
    }

    fn test_scheduler() -> Arc<Scheduler> {
        let fetcher = Arc::new(Fetcher::new("test-agent", RetryConfig::default()).unwrap());
        let renderer: Arc<dyn crawler_render::Renderer> = Arc::new(NoopRenderer);
        let pipeline = Arc::new(StoragePipeline::new(Arc::new(EmptyObjectStore), Arc::new(EmptyRepository)));
        let engine = Arc::new(CrawlerEngine::new(fetcher, renderer, pipeline));

        let mut sites = StdHashMap::new();
        sites.insert(
            "example".to_string(),
            SiteEntry {
                spider: Arc::new(EmptySpider),
                config: test_site_config(),
            },
        );

        Arc::new(Scheduler::new(engine, sites, SchedulerConfig::default()))
    }

    #[tokio::test]
    async fn add_get_remove_job_roundtrip() {
        let scheduler = test_scheduler();
        let job = ScheduledJob::new_date("manual_crawl_example_1".to_string(), "example".to_string(), Utc::now());
        scheduler.add_job(job);

        assert!(scheduler.get_job("manual_crawl_example_1").is_some());
        assert_eq!(scheduler.get_jobs().len(), 1);
        assert!(scheduler.remove_job("manual_crawl_example_1"));
        assert!(scheduler.get_job("manual_crawl_example_1").is_none());
    }

    #[tokio::test]
    async fn is_running_defaults_false() {
        let scheduler = test_scheduler();
        assert!(!scheduler.is_running("crawl_example"));
    }

    #[tokio::test]
    async fn manual_trigger_rejects_before_scheduler_started() {
        let scheduler = test_scheduler();
        let err = scheduler.trigger_manual_crawl("example").await.unwrap_err();
        assert!(matches!(err, SchedulerError::SchedulerUnavailable));
    }

    #[tokio::test]
    async fn manual_trigger_rejects_unknown_site() {
        let scheduler = test_scheduler();
        scheduler.start().await;
        let err = scheduler.trigger_manual_crawl("not-a-site").await.unwrap_err();
        assert!(matches!(err, SchedulerError::SiteNotFound(_)));
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn manual_trigger_rejects_when_already_running() {
        let scheduler = test_scheduler();
        scheduler.start().await;
        scheduler.running.insert("crawl_example".to_string(), true);
        let err = scheduler.trigger_manual_crawl("example").await.unwrap_err();
        assert!(matches!(err, SchedulerError::AlreadyRunning(_)));
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn manual_trigger_succeeds_for_known_idle_site() {
        let scheduler = test_scheduler();
        scheduler.start().await;
        let job_id = scheduler.trigger_manual_crawl("example").await.unwrap();
        assert!(job_id.starts_with("manual_crawl_example_"));
        scheduler.shutdown().await;
    }
}
