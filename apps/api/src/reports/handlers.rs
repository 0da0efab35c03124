use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppJson};
use crate::models::report::{ReportJobRow, ReportKind, ReportStatus};
use crate::reports::queue::{enqueue_report, get_job};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportRequest {
    pub kind: ReportKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStatusResponse {
    pub job_id: Uuid,
    pub result_id: Uuid,
    pub kind: String,
    pub status: String,
    pub error_message: Option<String>,
}

impl From<ReportJobRow> for ReportStatusResponse {
    fn from(job: ReportJobRow) -> Self {
        Self {
            job_id: job.id,
            result_id: job.result_id,
            kind: job.kind,
            status: job.status,
            error_message: job.error_message,
        }
    }
}

/// POST /api/v1/results/:id/reports
pub async fn handle_request_report(
    State(state): State<AppState>,
    Path(result_id): Path<Uuid>,
    AppJson(request): AppJson<ReportRequest>,
) -> Result<(StatusCode, Json<ReportStatusResponse>), AppError> {
    let job = enqueue_report(&state, result_id, request.kind).await?;
    Ok((StatusCode::ACCEPTED, Json(job.into())))
}

/// GET /api/v1/reports/:job_id/status
pub async fn handle_report_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ReportStatusResponse>, AppError> {
    Ok(Json(get_job(&state.db, job_id).await?.into()))
}

/// GET /api/v1/reports/:job_id
///
/// Returns the rendered HTML once the job is done; 409 while it is still pending.
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let job = get_job(&state.db, job_id).await?;

    let key = match (job.status(), job.artifact_key.as_deref()) {
        (Some(ReportStatus::Done), Some(key)) => key.to_string(),
        (Some(ReportStatus::Failed), _) => {
            return Err(AppError::UnprocessableEntity(format!(
                "Report job {job_id} failed: {}",
                job.error_message.unwrap_or_default()
            )))
        }
        _ => {
            return Err(AppError::Conflict(format!(
                "Report job {job_id} is {}",
                job.status
            )))
        }
    };

    let body = state.artifacts.get(&key).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response())
}
