use crate::dto::{CreateContentRequest, ListContentsQuery};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use crawler_storage::StorageError;
use crawler_types::{ContentRecord, Item};
use tracing::instrument;

#[instrument(skip(state))]
pub async fn list_contents(State(state): State<AppState>, Query(query): Query<ListContentsQuery>) -> ApiResult<Json<Vec<ContentRecord>>> {
    if query.skip < 0 {
        return Err(ApiError::InvalidParameter {
            name: "skip".to_string(),
            message: "must be >= 0".to_string(),
        });
    }
    if !(1..=1000).contains(&query.limit) {
        return Err(ApiError::InvalidParameter {
            name: "limit".to_string(),
            message: "must be between 1 and 1000".to_string(),
        });
    }

    let records = state
        .content_repository
        .list(query.skip, query.limit, query.source.as_deref())
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(records))
}

#[instrument(skip(state))]
pub async fn get_content(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<ContentRecord>> {
    let record = state
        .content_repository
        .find_by_id(id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::ContentNotFound(id.to_string()))?;

    Ok(Json(record))
}

#[instrument(skip(state, body))]
pub async fn create_content(State(state): State<AppState>, Json(body): Json<CreateContentRequest>) -> ApiResult<Json<ContentRecord>> {
    let mut item = Item::new(body.url, body.source, body.title, body.body);
    item.author = body.author;
    item.published_at = body.published_at;

    match state.pipeline.create_one(&item).await {
        Ok(record) => Ok(Json(record)),
        Err(StorageError::DuplicateUrl) => Err(ApiError::DuplicateUrl(item.url)),
        Err(err) => Err(ApiError::Internal(anyhow::anyhow!(err.to_string()))),
    }
}
