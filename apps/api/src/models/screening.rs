use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted screening. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: Option<String>,
    pub position_title: String,
    pub score: i32,
    pub recommendation: Option<String>,
    pub summary: String,
    pub details: Value,
    pub raw_jd: String,
    pub raw_resume: String,
    pub created_at: DateTime<Utc>,
}
