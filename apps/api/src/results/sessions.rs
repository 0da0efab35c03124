//! Per-question answer sessions.
//!
//! A session collects answers one question at a time; re-answering a question
//! overwrites the previous value. Completion scores whatever was answered and
//! locks the session: it can never be completed twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::result::ResultRow;
use crate::models::session::{AnswerSessionRow, SessionAnswerRow};
use crate::results::repository::{insert_result, NewResult};
use crate::results::service::Owner;
use crate::scoring::catalog::InstrumentCatalog;
use crate::scoring::engine::round2;
use crate::scoring::{score, Answers};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProgress {
    pub session_id: Uuid,
    pub instrument_id: String,
    pub answered: usize,
    pub total: usize,
    pub percent: f64,
    pub completed: bool,
    pub result_id: Option<Uuid>,
}

pub fn progress_percent(answered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2((answered as f64 / total as f64 * 100.0).min(100.0))
}

/// Whole seconds between session start and completion, saturating at `i32::MAX`.
pub fn elapsed_seconds(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> i32 {
    let secs = (completed_at - started_at).num_seconds().max(0);
    i32::try_from(secs).unwrap_or(i32::MAX)
}

pub fn answers_from_rows(rows: &[SessionAnswerRow]) -> Result<Answers, AppError> {
    rows.iter()
        .map(|row| {
            let question = u32::try_from(row.question_id);
            let value = u8::try_from(row.value);
            match (question, value) {
                (Ok(q), Ok(v)) => Ok((q, i64::from(v))),
                _ => Err(AppError::Internal(anyhow::anyhow!(
                    "Corrupt stored answer in session {}: question {} value {}",
                    row.session_id,
                    row.question_id,
                    row.value
                ))),
            }
        })
        .collect()
}

pub async fn start_session(
    pool: &PgPool,
    catalog: &InstrumentCatalog,
    instrument_id: &str,
    owner: Owner,
) -> Result<AnswerSessionRow, AppError> {
    let instrument = catalog.get(instrument_id)?;

    let session = sqlx::query_as::<_, AnswerSessionRow>(
        r#"
        INSERT INTO answer_sessions (id, instrument_id, collaborator_id, company_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&instrument.id)
    .bind(owner.collaborator_id)
    .bind(owner.company_id)
    .fetch_one(pool)
    .await?;

    info!("Started session {} for instrument {}", session.id, instrument.id);
    Ok(session)
}

async fn load_session(pool: &PgPool, session_id: Uuid) -> Result<AnswerSessionRow, AppError> {
    sqlx::query_as::<_, AnswerSessionRow>("SELECT * FROM answer_sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

async fn count_answers(pool: &PgPool, session_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM session_answers WHERE session_id = $1")
        .bind(session_id)
        .fetch_one(pool)
        .await
}

pub async fn get_progress(
    pool: &PgPool,
    catalog: &InstrumentCatalog,
    session_id: Uuid,
) -> Result<SessionProgress, AppError> {
    let session = load_session(pool, session_id).await?;
    let instrument = catalog.get(&session.instrument_id)?;
    let answered = usize::try_from(count_answers(pool, session_id).await?).unwrap_or(0);
    let total = instrument.question_count as usize;

    Ok(SessionProgress {
        session_id,
        instrument_id: session.instrument_id,
        answered,
        total,
        percent: progress_percent(answered, total),
        completed: session.completed_at.is_some(),
        result_id: session.result_id,
    })
}

pub async fn save_answer(
    pool: &PgPool,
    catalog: &InstrumentCatalog,
    session_id: Uuid,
    question_id: u32,
    value: i64,
) -> Result<SessionProgress, AppError> {
    let session = load_session(pool, session_id).await?;
    if session.completed_at.is_some() {
        return Err(AppError::Conflict(format!(
            "Session {session_id} is already completed"
        )));
    }
    let instrument = catalog.get(&session.instrument_id)?;
    instrument.check_answer(question_id, value)?;

    let question = i32::try_from(question_id)
        .map_err(|_| AppError::Validation(format!("question id {question_id} is too large")))?;
    let stored = i16::try_from(value)
        .map_err(|_| AppError::Validation(format!("answer {value} does not fit the scale")))?;

    sqlx::query(
        r#"
        INSERT INTO session_answers (session_id, question_id, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (session_id, question_id)
        DO UPDATE SET value = EXCLUDED.value, answered_at = now()
        "#,
    )
    .bind(session_id)
    .bind(question)
    .bind(stored)
    .execute(pool)
    .await?;

    get_progress(pool, catalog, session_id).await
}

/// Scores the session's answers, stores the result and marks the session completed,
/// all in one transaction. The row lock makes concurrent completions serialize;
/// the loser sees `completed_at` set and gets a conflict.
pub async fn complete_session(
    pool: &PgPool,
    catalog: &InstrumentCatalog,
    session_id: Uuid,
) -> Result<ResultRow, AppError> {
    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, AnswerSessionRow>(
        "SELECT * FROM answer_sessions WHERE id = $1 FOR UPDATE",
    )
    .bind(session_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    if session.completed_at.is_some() {
        return Err(AppError::Conflict(format!(
            "Session {session_id} is already completed"
        )));
    }

    let rows = sqlx::query_as::<_, SessionAnswerRow>(
        "SELECT * FROM session_answers WHERE session_id = $1 ORDER BY question_id",
    )
    .bind(session_id)
    .fetch_all(&mut *tx)
    .await?;

    let instrument = catalog.get(&session.instrument_id)?;
    let answers = answers_from_rows(&rows)?;
    let card = score(instrument, &answers)?;

    let completed_at = Utc::now();
    let result = insert_result(
        &mut *tx,
        NewResult {
            instrument_id: &instrument.id,
            collaborator_id: session.collaborator_id,
            company_id: session.company_id,
            time_spent_seconds: Some(elapsed_seconds(session.started_at, completed_at)),
            card: &card,
        },
    )
    .await?;

    sqlx::query("UPDATE answer_sessions SET completed_at = $1, result_id = $2 WHERE id = $3")
        .bind(completed_at)
        .bind(result.id)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Completed session {session_id} → result {} ({} answers)",
        result.id, card.answered
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(question_id: i32, value: i16) -> SessionAnswerRow {
        SessionAnswerRow {
            session_id: Uuid::nil(),
            question_id,
            value,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 50), 0.0);
        assert_eq!(progress_percent(25, 50), 50.0);
        assert_eq!(progress_percent(1, 3), 33.33);
        assert_eq!(progress_percent(50, 50), 100.0);
        assert_eq!(progress_percent(3, 0), 0.0);
    }

    #[test]
    fn test_elapsed_seconds() {
        let start = Utc::now();
        assert_eq!(elapsed_seconds(start, start + Duration::seconds(95)), 95);
        // clock skew never yields a negative duration
        assert_eq!(elapsed_seconds(start, start - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_answers_from_rows() {
        let answers = answers_from_rows(&[row(1, 4), row(48, 2)]).unwrap();
        assert_eq!(answers.get(&1), Some(&4));
        assert_eq!(answers.get(&48), Some(&2));
    }

    #[test]
    fn test_corrupt_rows_rejected() {
        assert!(answers_from_rows(&[row(-1, 3)]).is_err());
        assert!(answers_from_rows(&[row(1, 300)]).is_err());
    }
}
