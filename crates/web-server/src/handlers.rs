use crate::{AppState, error::AppError};
use analytics::AnalysisReport;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
};
use chrono::NaiveDate;
use core_types::Window;
use events::JobRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Optional body of `POST /analyze`. Both dates or neither.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub task_id: Uuid,
    pub status: String,
}

fn require_api_key(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(key) if !expected.is_empty() && key == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

/// An empty body asks for the default window; anything else must be a valid request.
fn parse_analyze_request(body: &[u8]) -> Result<AnalyzeRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AnalyzeRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

fn parse_task_id(task_id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(task_id).map_err(|_| AppError::NotFound("Task not found".to_string()))
}

/// # POST /analyze
/// Starts an analysis job and returns its id without waiting for it.
pub async fn start_analysis(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, AppError> {
    require_api_key(&headers, &state.api_key)?;

    let request = parse_analyze_request(&body)?;
    let window = match (request.from, request.to) {
        (Some(from), Some(to)) => Window::new(from, to)?,
        (None, None) => state.dispatcher.default_window(),
        _ => {
            return Err(AppError::BadRequest(
                "'from' and 'to' must be given together".to_string(),
            ));
        }
    };

    let (task_id, _worker) = state.dispatcher.submit(window).await;
    Ok(Json(AnalyzeResponse {
        task_id,
        status: "running".to_string(),
    }))
}

/// # GET /task/:task_id
pub async fn get_task_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> Result<Json<JobRecord>, AppError> {
    require_api_key(&headers, &state.api_key)?;
    let task_id = parse_task_id(&task_id)?;
    state
        .dispatcher
        .store()
        .get(task_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
}

/// # GET /task/:task_id/report
/// The full report of a completed job.
pub async fn get_task_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> Result<Json<AnalysisReport>, AppError> {
    require_api_key(&headers, &state.api_key)?;
    let task_id = parse_task_id(&task_id)?;
    let report = state
        .dispatcher
        .store()
        .report(task_id)
        .await
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;
    Ok(Json(report.as_ref().clone()))
}
