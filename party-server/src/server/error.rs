use crate::party_store::{SubmissionError, SubmissionStatus};
use crate::server::metrics::record_error;
use crate::slideshow::ControlError;
use crate::video_rotation::RotationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Submission already {}", .0.as_str())]
    Conflict(SubmissionStatus),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Validation(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        record_error(self.kind());
        let body = match &self {
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                json!({ "error": self.to_string() })
            }
            ApiError::Conflict(status) => json!({
                "error": self.to_string(),
                "status": status,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<RotationError> for ApiError {
    fn from(err: RotationError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
