use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::result::ResultRow;
use crate::scoring::ScoreCard;

pub struct NewResult<'a> {
    pub instrument_id: &'a str,
    pub collaborator_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub time_spent_seconds: Option<i32>,
    pub card: &'a ScoreCard,
}

/// Inserts a scored result. Accepts a pool or an open transaction.
pub async fn insert_result<'e, E>(executor: E, new: NewResult<'_>) -> Result<ResultRow, AppError>
where
    E: PgExecutor<'e>,
{
    let metadata = serde_json::to_value(new.card).context("Failed to serialize score card")?;
    let total_score = i32::try_from(new.card.total_score).context("total_score overflows i32")?;

    let row = sqlx::query_as::<_, ResultRow>(
        r#"
        INSERT INTO results
            (id, instrument_id, collaborator_id, company_id, total_score, time_spent_seconds, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.instrument_id)
    .bind(new.collaborator_id)
    .bind(new.company_id)
    .bind(total_score)
    .bind(new.time_spent_seconds)
    .bind(metadata)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_result(pool: &PgPool, id: Uuid) -> Result<Option<ResultRow>, sqlx::Error> {
    sqlx::query_as::<_, ResultRow>("SELECT * FROM results WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_collaborator(
    pool: &PgPool,
    collaborator_id: Uuid,
) -> Result<Vec<ResultRow>, sqlx::Error> {
    sqlx::query_as::<_, ResultRow>(
        "SELECT * FROM results WHERE collaborator_id = $1 ORDER BY created_at DESC",
    )
    .bind(collaborator_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_company_instrument(
    pool: &PgPool,
    company_id: Uuid,
    instrument_id: &str,
) -> Result<Vec<ResultRow>, sqlx::Error> {
    sqlx::query_as::<_, ResultRow>(
        "SELECT * FROM results WHERE company_id = $1 AND instrument_id = $2 ORDER BY created_at ASC",
    )
    .bind(company_id)
    .bind(instrument_id)
    .fetch_all(pool)
    .await
}
