use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid API key")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Invalid analysis window: {0}")]
    InvalidWindow(#[from] core_types::CoreError),
    #[error("Job state error: {0}")]
    Job(#[from] events::EventsError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid API key".to_string()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidWindow(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Job(job_err) => {
                tracing::error!(error = ?job_err, "Job state error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal job state error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
