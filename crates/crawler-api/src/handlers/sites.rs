use crate::dto::{
    BatchCrawlOutcome, BatchCrawlRequest, BatchCrawlResult, CrawlTriggerResponse, RunInfo, SiteDetailResponse,
    SiteInfo, SiteStatusResponse, SitesResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn list_sites(State(state): State<AppState>) -> Json<SitesResponse> {
    let sites = state.scheduler.site_names();
    let mut sites_info = HashMap::new();
    for name in &sites {
        sites_info.insert(name.clone(), site_info(&state, name));
    }
    Json(SitesResponse { sites, sites_info })
}

#[instrument(skip(state))]
pub async fn get_site(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<SiteDetailResponse>> {
    let config = state.scheduler.site_config(&name).ok_or_else(|| ApiError::SiteNotFound(name.clone()))?;
    let job_id = format!("crawl_{name}");
    let is_running = state.scheduler.is_running(&job_id);
    let recent_runs = state.scheduler.recent_runs(&job_id).into_iter().map(RunInfo::from).collect();

    Ok(Json(SiteDetailResponse {
        site: name,
        config,
        is_running,
        recent_runs,
    }))
}

#[instrument(skip(state))]
pub async fn site_status(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<SiteStatusResponse>> {
    if !state.scheduler.has_site(&name) {
        return Err(ApiError::SiteNotFound(name));
    }
    let job_id = format!("crawl_{name}");
    Ok(Json(SiteStatusResponse {
        is_running: state.scheduler.is_running(&job_id),
        latest_run: state.scheduler.latest_run(&job_id).map(RunInfo::from),
        site: name,
    }))
}

#[instrument(skip(state))]
pub async fn trigger_crawl(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<CrawlTriggerResponse>> {
    let flow_run_id = state
        .scheduler
        .trigger_manual_crawl(&name)
        .await
        .map_err(|err| map_scheduler_error(&name, err))?;

    Ok(Json(CrawlTriggerResponse {
        message: format!("crawl triggered for {name}"),
        site: name,
        flow_run_id,
    }))
}

#[instrument(skip(state, body))]
pub async fn batch_crawl(State(state): State<AppState>, Json(body): Json<BatchCrawlRequest>) -> Json<BatchCrawlResult> {
    let targets = body.sites.unwrap_or_else(|| state.scheduler.site_names());

    let trigger_one = |site: String| {
        let state = state.clone();
        async move {
            let outcome = match state.scheduler.trigger_manual_crawl(&site).await {
                Ok(flow_run_id) => BatchCrawlOutcome::Triggered { flow_run_id },
                Err(crawler_scheduler::SchedulerError::AlreadyRunning(_)) => BatchCrawlOutcome::AlreadyRunning,
                Err(err) => BatchCrawlOutcome::Error { message: err.to_string() },
            };
            (site, outcome)
        }
    };

    let results: HashMap<String, BatchCrawlOutcome> = if body.parallel {
        join_all(targets.into_iter().map(trigger_one)).await.into_iter().collect()
    } else {
        let mut results = HashMap::new();
        for site in targets {
            let (site, outcome) = trigger_one(site).await;
            results.insert(site, outcome);
        }
        results
    };

    Json(BatchCrawlResult { results })
}

fn site_info(state: &AppState, name: &str) -> SiteInfo {
    let config = state.scheduler.site_config(name).expect("site listed by site_names() must exist");
    let job_id = format!("crawl_{name}");
    SiteInfo {
        config,
        is_running: state.scheduler.is_running(&job_id),
        latest_run: state.scheduler.latest_run(&job_id).map(RunInfo::from),
    }
}

fn map_scheduler_error(site: &str, err: crawler_scheduler::SchedulerError) -> ApiError {
    match err {
        crawler_scheduler::SchedulerError::SiteNotFound(_) => ApiError::SiteNotFound(site.to_string()),
        crawler_scheduler::SchedulerError::AlreadyRunning(job_id) => ApiError::AlreadyRunning(job_id),
        crawler_scheduler::SchedulerError::SchedulerUnavailable => ApiError::SchedulerUnavailable,
        other => ApiError::Internal(anyhow::anyhow!(other.to_string())),
    }
}
