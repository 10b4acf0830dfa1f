use crate::dto::{JobDescriptor, JobDetailResponse, RunInfo};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobDescriptor>> {
    Json(state.scheduler.get_jobs().into_iter().map(JobDescriptor::from).collect())
}

#[instrument(skip(state))]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JobDetailResponse>> {
    let job = state.scheduler.get_job(&id).ok_or_else(|| ApiError::JobNotFound(id.clone()))?;
    let recent_runs = state.scheduler.recent_runs(&id).into_iter().map(RunInfo::from).collect();

    Ok(Json(JobDetailResponse {
        id: job.id,
        site: job.site,
        recent_runs,
    }))
}
