use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::scoring::ScoreCard;

/// A stored questionnaire result. `metadata` holds the serialized `ScoreCard`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResultRow {
    pub id: Uuid,
    pub instrument_id: String,
    pub collaborator_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub total_score: i32,
    pub time_spent_seconds: Option<i32>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl ResultRow {
    /// Parses `metadata` back into a score card. Rows written by older
    /// scoring code may not match, so callers decide how to treat `None`.
    pub fn score_card(&self) -> Option<ScoreCard> {
        serde_json::from_value(self.metadata.clone()).ok()
    }
}
