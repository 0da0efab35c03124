use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::companies::repository::{count_collaborators, get_collaborator, get_company};
use crate::dashboard::aggregate::{
    aggregate_company, summarize, AdminOverview, CompanyDashboard, InstrumentCount, ResultSummary,
};
use crate::errors::AppError;
use crate::results::repository::{list_for_collaborator, list_for_company_instrument};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub instrument_id: String,
}

/// GET /api/v1/collaborators/:id/results
///
/// Employee dashboard: the collaborator's own results, newest first.
pub async fn handle_collaborator_results(
    State(state): State<AppState>,
    Path(collaborator_id): Path<Uuid>,
) -> Result<Json<Vec<ResultSummary>>, AppError> {
    get_collaborator(&state.db, collaborator_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collaborator {collaborator_id} not found")))?;

    let rows = list_for_collaborator(&state.db, collaborator_id).await?;
    Ok(Json(rows.iter().map(summarize).collect()))
}

/// GET /api/v1/companies/:id/dashboard?instrument_id=
pub async fn handle_company_dashboard(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<CompanyDashboard>, AppError> {
    let instrument = state.catalog.get(&params.instrument_id)?;
    get_company(&state.db, company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))?;

    let rows = list_for_company_instrument(&state.db, company_id, &instrument.id).await?;
    let collaborators = usize::try_from(count_collaborators(&state.db, company_id).await?).unwrap_or(0);

    let cards: Vec<_> = rows
        .iter()
        .filter_map(|row| match row.score_card() {
            Some(card) => Some((row.collaborator_id, card)),
            None => {
                warn!("Result {} has unreadable metadata; skipped in dashboard", row.id);
                None
            }
        })
        .collect();

    Ok(Json(aggregate_company(
        instrument,
        company_id,
        collaborators,
        &cards,
    )))
}

/// GET /api/v1/admin/overview
pub async fn handle_admin_overview(
    State(state): State<AppState>,
) -> Result<Json<AdminOverview>, AppError> {
    let companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
        .fetch_one(&state.db)
        .await?;
    let collaborators: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collaborators")
        .fetch_one(&state.db)
        .await?;
    let per_instrument: Vec<(String, i64)> = sqlx::query_as(
        "SELECT instrument_id, COUNT(*) FROM results GROUP BY instrument_id ORDER BY instrument_id",
    )
    .fetch_all(&state.db)
    .await?;

    let results = per_instrument.iter().map(|(_, n)| n).sum();
    let results_per_instrument = per_instrument
        .into_iter()
        .map(|(instrument_id, results)| InstrumentCount {
            instrument_name: state
                .catalog
                .get(&instrument_id)
                .map(|i| i.name.clone())
                .unwrap_or_else(|_| instrument_id.clone()),
            instrument_id,
            results,
        })
        .collect();

    Ok(Json(AdminOverview {
        companies,
        collaborators,
        results,
        results_per_instrument,
    }))
}
