use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::companies::repository::{
    get_company, insert_collaborator, insert_company, list_collaborators, NewCollaborator,
};
use crate::errors::{AppError, AppJson};
use crate::models::company::{CollaboratorRow, CompanyRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub cnpj: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollaboratorRequest {
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

/// Keeps only digits; a CNPJ has exactly 14 of them.
fn normalize_cnpj(raw: &str) -> Result<String, AppError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 14 {
        return Err(AppError::Validation(format!(
            "cnpj must contain 14 digits, got {}",
            digits.len()
        )));
    }
    Ok(digits)
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = email
        .split_once('@')
        .map(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("'{email}' is not a valid email")))
    }
}

/// POST /api/v1/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyRow>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let cnpj = request.cnpj.as_deref().map(normalize_cnpj).transpose()?;

    let company = insert_company(&state.db, name, cnpj.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies/:id/collaborators
pub async fn handle_list_collaborators(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<Vec<CollaboratorRow>>, AppError> {
    get_company(&state.db, company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))?;

    Ok(Json(list_collaborators(&state.db, company_id).await?))
}

/// POST /api/v1/companies/:id/collaborators
pub async fn handle_create_collaborator(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    AppJson(request): AppJson<CreateCollaboratorRequest>,
) -> Result<(StatusCode, Json<CollaboratorRow>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let email = request.email.trim().to_lowercase();
    validate_email(&email)?;

    get_company(&state.db, company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))?;

    let collaborator = insert_collaborator(
        &state.db,
        NewCollaborator {
            company_id,
            name,
            email: &email,
            department: request.department.as_deref(),
        },
    )
    .await
    .map_err(|e| {
        let duplicate = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if duplicate {
            AppError::Conflict(format!("{email} is already registered for this company"))
        } else {
            AppError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(collaborator)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cnpj_normalization() {
        assert_eq!(normalize_cnpj("12.345.678/0001-95").unwrap(), "12345678000195");
        assert!(normalize_cnpj("123").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ana@empresa.com.br").is_ok());
        assert!(validate_email("ana@empresa").is_err());
        assert!(validate_email("@empresa.com").is_err());
        assert!(validate_email("ana.empresa.com").is_err());
    }
}
