use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error types for the management API, each mapping to the HTTP status
/// code the §6 contract names for it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("site not found: {0}")]
    SiteNotFound(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("content not found: {0}")]
    ContentNotFound(String),

    #[error("job already running: {0}")]
    AlreadyRunning(String),

    #[error("duplicate url: {0}")]
    DuplicateUrl(String),

    #[error("scheduler not started")]
    SchedulerUnavailable,

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::SiteNotFound(_) | ApiError::JobNotFound(_) | ApiError::ContentNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyRunning(_) | ApiError::DuplicateUrl(_) => StatusCode::CONFLICT,
            ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::SchedulerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!(%message, "api error"),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => tracing::warn!(%message, "client error"),
            _ => tracing::info!(%message, "api error"),
        }

        let body = Json(json!({
            "error": {
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
