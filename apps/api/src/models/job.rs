use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One tracked job posting. `detailed_score` holds the canonical breakdown
/// JSON once a scoring call succeeds; NULL means unscored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub url: Option<String>,
    pub location: Option<String>,
    pub description: String,
    /// Kanban column, see `job_status`.
    pub status: String,
    pub detailed_score: Option<Value>,
    pub scored_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One uploaded résumé, stored as extracted text. The most recently uploaded
/// row is the "current" résumé used for scoring and enhancement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub filename: String,
    pub body: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Kanban board columns.
pub mod job_status {
    pub const SAVED: &str = "saved";
    pub const APPLIED: &str = "applied";
    pub const INTERVIEW: &str = "interview";
    pub const OFFER: &str = "offer";
    pub const REJECTED: &str = "rejected";

    pub const ALL: [&str; 5] = [SAVED, APPLIED, INTERVIEW, OFFER, REJECTED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_validation() {
        assert!(job_status::is_valid("saved"));
        assert!(job_status::is_valid("rejected"));
        assert!(!job_status::is_valid("Saved"));
        assert!(!job_status::is_valid("archived"));
    }
}
