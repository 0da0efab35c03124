//! Axum route handlers for the instrument catalog. None of these touch the database.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::{AppError, AppJson};
use crate::scoring::instrument::{Instrument, InstrumentSummary};
use crate::scoring::{score, Answers, ScoreCard};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScorePreviewRequest {
    pub answers: Answers,
}

/// GET /api/v1/instruments
pub async fn handle_list_instruments(State(state): State<AppState>) -> Json<Vec<InstrumentSummary>> {
    Json(state.catalog.summaries())
}

/// GET /api/v1/instruments/:id
pub async fn handle_get_instrument(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Instrument>, AppError> {
    Ok(Json(state.catalog.get(&id)?.clone()))
}

/// POST /api/v1/instruments/:id/score
///
/// Scores answers without storing anything. Used for live previews while a
/// questionnaire is being filled in.
pub async fn handle_score_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<ScorePreviewRequest>,
) -> Result<Json<ScoreCard>, AppError> {
    let instrument = state.catalog.get(&id)?;
    Ok(Json(score(instrument, &request.answers)?))
}
