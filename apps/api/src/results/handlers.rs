use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppJson};
use crate::models::result::ResultRow;
use crate::models::session::AnswerSessionRow;
use crate::results::repository::get_result;
use crate::results::service::{resolve_owner, store_scored_result, validate_time_spent};
use crate::results::sessions::{
    complete_session, get_progress, save_answer, start_session, SessionProgress,
};
use crate::scoring::Answers;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResultRequest {
    pub instrument_id: String,
    pub answers: Answers,
    pub collaborator_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub time_spent_seconds: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub instrument_id: String,
    pub collaborator_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SaveAnswerRequest {
    pub value: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/results
///
/// Batch submission: scores every answer at once and stores the result.
pub async fn handle_submit_result(
    State(state): State<AppState>,
    AppJson(request): AppJson<SubmitResultRequest>,
) -> Result<(StatusCode, Json<ResultRow>), AppError> {
    let instrument = state.catalog.get(&request.instrument_id)?;
    let time_spent = validate_time_spent(request.time_spent_seconds)?;
    let owner = resolve_owner(&state.db, request.collaborator_id, request.company_id).await?;

    let row = store_scored_result(&state.db, instrument, &request.answers, owner, time_spent).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/results/:id
pub async fn handle_get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultRow>, AppError> {
    let row = get_result(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Result {id} not found")))?;
    Ok(Json(row))
}

/// POST /api/v1/sessions
pub async fn handle_start_session(
    State(state): State<AppState>,
    AppJson(request): AppJson<StartSessionRequest>,
) -> Result<(StatusCode, Json<AnswerSessionRow>), AppError> {
    let owner = resolve_owner(&state.db, request.collaborator_id, request.company_id).await?;
    let session = start_session(&state.db, &state.catalog, &request.instrument_id, owner).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_session_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionProgress>, AppError> {
    Ok(Json(get_progress(&state.db, &state.catalog, id).await?))
}

/// PUT /api/v1/sessions/:id/answers/:question_id
pub async fn handle_save_answer(
    State(state): State<AppState>,
    Path((id, question_id)): Path<(Uuid, u32)>,
    AppJson(request): AppJson<SaveAnswerRequest>,
) -> Result<Json<SessionProgress>, AppError> {
    let progress = save_answer(&state.db, &state.catalog, id, question_id, request.value).await?;
    Ok(Json(progress))
}

/// POST /api/v1/sessions/:id/complete
pub async fn handle_complete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ResultRow>), AppError> {
    let row = complete_session(&state.db, &state.catalog, id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
