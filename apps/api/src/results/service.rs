use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::companies::repository::{get_collaborator, get_company};
use crate::errors::AppError;
use crate::models::result::ResultRow;
use crate::results::repository::{insert_result, NewResult};
use crate::scoring::{score, Answers, Instrument};

/// Who a result or session belongs to. Both sides are optional: anonymous
/// submissions are allowed and simply never show up on a dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Owner {
    pub collaborator_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

/// A collaborator always answers on behalf of their own company.
pub fn reconcile_company(
    collaborator_company: Option<Uuid>,
    requested: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    match (collaborator_company, requested) {
        (Some(own), Some(req)) if own != req => Err(AppError::Validation(format!(
            "collaborator belongs to company {own}, not {req}"
        ))),
        (Some(own), _) => Ok(Some(own)),
        (None, req) => Ok(req),
    }
}

pub async fn resolve_owner(
    pool: &PgPool,
    collaborator_id: Option<Uuid>,
    company_id: Option<Uuid>,
) -> Result<Owner, AppError> {
    let collaborator_company = match collaborator_id {
        Some(id) => Some(
            get_collaborator(pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Collaborator {id} not found")))?
                .company_id,
        ),
        None => None,
    };

    let company_id = reconcile_company(collaborator_company, company_id)?;
    if collaborator_id.is_none() {
        if let Some(id) = company_id {
            get_company(pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))?;
        }
    }

    Ok(Owner {
        collaborator_id,
        company_id,
    })
}

pub fn validate_time_spent(seconds: Option<i32>) -> Result<Option<i32>, AppError> {
    match seconds {
        Some(s) if s < 0 => Err(AppError::Validation(
            "time_spent_seconds cannot be negative".to_string(),
        )),
        other => Ok(other),
    }
}

/// Scores a batch of answers and stores the outcome as a new result.
pub async fn store_scored_result(
    pool: &PgPool,
    instrument: &Instrument,
    answers: &Answers,
    owner: Owner,
    time_spent_seconds: Option<i32>,
) -> Result<ResultRow, AppError> {
    let card = score(instrument, answers)?;

    let row = insert_result(
        pool,
        NewResult {
            instrument_id: &instrument.id,
            collaborator_id: owner.collaborator_id,
            company_id: owner.company_id,
            time_spent_seconds,
            card: &card,
        },
    )
    .await?;

    info!(
        "Stored result {} for instrument {} ({} answers, index {:?})",
        row.id, instrument.id, card.answered, card.overall_index
    );
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_company_wins_when_not_requested() {
        let own = Uuid::new_v4();
        assert_eq!(reconcile_company(Some(own), None).unwrap(), Some(own));
    }

    #[test]
    fn test_mismatched_company_rejected() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(matches!(
            reconcile_company(Some(own), Some(other)),
            Err(AppError::Validation(_))
        ));
        assert_eq!(reconcile_company(Some(own), Some(own)).unwrap(), Some(own));
    }

    #[test]
    fn test_anonymous_submission_keeps_requested_company() {
        let req = Uuid::new_v4();
        assert_eq!(reconcile_company(None, Some(req)).unwrap(), Some(req));
        assert_eq!(reconcile_company(None, None).unwrap(), None);
    }

    #[test]
    fn test_negative_time_spent_rejected() {
        assert!(validate_time_spent(Some(-1)).is_err());
        assert_eq!(validate_time_spent(Some(120)).unwrap(), Some(120));
        assert_eq!(validate_time_spent(None).unwrap(), None);
    }
}
