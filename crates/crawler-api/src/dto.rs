use crawler_scheduler::{JobRun, JobStatus, ScheduledJob};
use crawler_types::SiteConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct RunInfo {
    pub run_id: String,
    pub status: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub items_stored: Option<usize>,
    pub error: Option<String>,
}

impl From<JobRun> for RunInfo {
    fn from(run: JobRun) -> Self {
        Self {
            run_id: run.run_id,
            status: status_str(run.status).to_string(),
            start_time: run.start_time,
            end_time: run.end_time,
            items_stored: run.items_stored,
            error: run.error,
        }
    }
}

fn status_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Succeeded => "succeeded",
        JobStatus::Failed => "failed",
    }
}

#[derive(Debug, Serialize)]
pub struct SiteInfo {
    pub config: SiteConfig,
    pub is_running: bool,
    pub latest_run: Option<RunInfo>,
}

#[derive(Debug, Serialize)]
pub struct SitesResponse {
    pub sites: Vec<String>,
    pub sites_info: HashMap<String, SiteInfo>,
}

#[derive(Debug, Serialize)]
pub struct SiteDetailResponse {
    pub site: String,
    pub config: SiteConfig,
    pub is_running: bool,
    pub recent_runs: Vec<RunInfo>,
}

#[derive(Debug, Serialize)]
pub struct SiteStatusResponse {
    pub site: String,
    pub is_running: bool,
    pub latest_run: Option<RunInfo>,
}

#[derive(Debug, Serialize)]
pub struct CrawlTriggerResponse {
    pub message: String,
    pub site: String,
    pub flow_run_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct BatchCrawlRequest {
    pub sites: Option<Vec<String>>,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchCrawlResult {
    pub results: HashMap<String, BatchCrawlOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum BatchCrawlOutcome {
    #[serde(rename = "triggered")]
    Triggered { flow_run_id: String },
    #[serde(rename = "already_running")]
    AlreadyRunning,
    #[serde(rename = "error")]
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct JobDescriptor {
    pub id: String,
    pub site: String,
}

impl From<ScheduledJob> for JobDescriptor {
    fn from(job: ScheduledJob) -> Self {
        Self { id: job.id, site: job.site }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub id: String,
    pub site: String,
    pub recent_runs: Vec<RunInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ListContentsQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub source: Option<String>,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub source: String,
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub body: String,
}

