pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::companies::handlers as companies;
use crate::dashboard::handlers as dashboard;
use crate::reports::handlers as reports;
use crate::results::handlers as results;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Instrument catalog
        .route("/api/v1/instruments", get(scoring::handle_list_instruments))
        .route("/api/v1/instruments/:id", get(scoring::handle_get_instrument))
        .route(
            "/api/v1/instruments/:id/score",
            post(scoring::handle_score_preview),
        )
        // Results and answer sessions
        .route("/api/v1/results", post(results::handle_submit_result))
        .route("/api/v1/results/:id", get(results::handle_get_result))
        .route("/api/v1/sessions", post(results::handle_start_session))
        .route("/api/v1/sessions/:id", get(results::handle_session_progress))
        .route(
            "/api/v1/sessions/:id/answers/:question_id",
            put(results::handle_save_answer),
        )
        .route(
            "/api/v1/sessions/:id/complete",
            post(results::handle_complete_session),
        )
        // Companies and collaborators
        .route("/api/v1/companies", post(companies::handle_create_company))
        .route(
            "/api/v1/companies/:id/collaborators",
            get(companies::handle_list_collaborators).post(companies::handle_create_collaborator),
        )
        // Dashboards
        .route(
            "/api/v1/companies/:id/dashboard",
            get(dashboard::handle_company_dashboard),
        )
        .route(
            "/api/v1/collaborators/:id/results",
            get(dashboard::handle_collaborator_results),
        )
        .route("/api/v1/admin/overview", get(dashboard::handle_admin_overview))
        // Reports
        .route(
            "/api/v1/results/:id/reports",
            post(reports::handle_request_report),
        )
        .route(
            "/api/v1/reports/:job_id/status",
            get(reports::handle_report_status),
        )
        .route("/api/v1/reports/:job_id", get(reports::handle_get_report))
        .with_state(state)
}
