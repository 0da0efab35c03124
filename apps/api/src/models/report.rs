use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Result,
    Certificate,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Result => "result",
            ReportKind::Certificate => "certificate",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "result" => Some(ReportKind::Result),
            "certificate" => Some(ReportKind::Certificate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Queued,
    Processing,
    Done,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Queued => "queued",
            ReportStatus::Processing => "processing",
            ReportStatus::Done => "done",
            ReportStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "queued" => Some(ReportStatus::Queued),
            "processing" => Some(ReportStatus::Processing),
            "done" => Some(ReportStatus::Done),
            "failed" => Some(ReportStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Done | ReportStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportJobRow {
    pub id: Uuid,
    pub result_id: Uuid,
    pub kind: String,
    pub status: String,
    pub artifact_key: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportJobRow {
    pub fn status(&self) -> Option<ReportStatus> {
        ReportStatus::parse(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ReportKind::parse("certificate"), Some(ReportKind::Certificate));
        assert_eq!(ReportKind::parse("pdf"), None);
        assert_eq!(ReportKind::parse(ReportKind::Result.as_str()), Some(ReportKind::Result));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ReportStatus::Done.is_terminal());
        assert!(ReportStatus::Failed.is_terminal());
        assert!(!ReportStatus::Queued.is_terminal());
        assert!(!ReportStatus::Processing.is_terminal());
    }
}
