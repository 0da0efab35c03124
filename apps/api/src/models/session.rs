use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerSessionRow {
    pub id: Uuid,
    pub instrument_id: String,
    pub collaborator_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionAnswerRow {
    pub session_id: Uuid,
    pub question_id: i32,
    pub value: i16,
    pub answered_at: DateTime<Utc>,
}
