use adapter::DispatchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::ThreadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Worker closed")]
    WorkerClosed,

    #[error("Timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Domain(ThreadError::CommentNotFound(_)) | DispatchError::PostNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            DispatchError::Domain(ThreadError::EmptyContent) | DispatchError::EmptyPost => {
                ApiError::BadRequest(err.to_string())
            }
            DispatchError::Domain(ThreadError::Forbidden(_))
            | DispatchError::Domain(ThreadError::PostBlocked)
            | DispatchError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            DispatchError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::WorkerClosed => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(?err, "internal server error");
                "Internal server error, see logs for details".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
