//! Screening history persistence.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::position::extract_position_title;
use crate::models::screening::ScreeningRow;
use crate::screening::models::{Recommendation, ScreeningResult};

pub const UNKNOWN_CANDIDATE: &str = "Unknown";

/// A completed screening, ready to be appended to a user's history.
#[derive(Debug, Clone)]
pub struct NewScreening {
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
}

impl NewScreening {
    pub fn from_result(
        user_id: Uuid,
        result: &ScreeningResult,
        job_description: &str,
        resume: &str,
    ) -> Self {
        let candidate_name = result
            .candidate_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_CANDIDATE)
            .to_string();

        Self {
            user_id,
            candidate_name,
            candidate_email: result.candidate_email.clone().filter(|e| !e.trim().is_empty()),
            position_title: extract_position_title(job_description),
            score: result.score,
            recommendation: result.recommendation.map(|r| r.as_str().to_string()),
            summary: result.summary.clone(),
            details: serde_json::to_value(&result.details).unwrap_or_else(|_| Value::Array(vec![])),
            raw_jd: job_description.to_string(),
            raw_resume: resume.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Interview,
    Reject,
}

impl StatusFilter {
    pub fn recommendation(&self) -> Option<Recommendation> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Interview => Some(Recommendation::Interview),
            StatusFilter::Reject => Some(Recommendation::Reject),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Score,
}

/// History query parameters, as accepted on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreeningQuery {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort_by: SortBy,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait ScreeningStore: Send + Sync {
    async fn save_screening(&self, screening: NewScreening) -> Result<ScreeningRow, AppError>;

    async fn list_screenings(
        &self,
        user_id: Uuid,
        query: &ScreeningQuery,
    ) -> Result<Vec<ScreeningRow>, AppError>;

    async fn get_screening(
        &self,
        user_id: Uuid,
        screening_id: Uuid,
    ) -> Result<Option<ScreeningRow>, AppError>;
}

pub struct PgScreeningStore {
    pool: PgPool,
}

impl PgScreeningStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScreeningStore for PgScreeningStore {
    async fn save_screening(&self, s: NewScreening) -> Result<ScreeningRow, AppError> {
        let row: ScreeningRow = sqlx::query_as(
            r#"
            INSERT INTO screenings
                (user_id, candidate_name, candidate_email, position_title, score,
                 recommendation, summary, details, raw_jd, raw_resume)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(s.user_id)
        .bind(&s.candidate_name)
        .bind(&s.candidate_email)
        .bind(&s.position_title)
        .bind(s.score)
        .bind(&s.recommendation)
        .bind(&s.summary)
        .bind(&s.details)
        .bind(&s.raw_jd)
        .bind(&s.raw_resume)
        .fetch_one(&self.pool)
        .await?;

        info!("Saved screening {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn list_screenings(
        &self,
        user_id: Uuid,
        query: &ScreeningQuery,
    ) -> Result<Vec<ScreeningRow>, AppError> {
        // Only the ORDER BY column varies; it comes from a closed enum.
        let order = match query.sort_by {
            SortBy::Date => "created_at DESC",
            SortBy::Score => "score DESC",
        };
        let sql = format!(
            r#"
            SELECT * FROM screenings
            WHERE user_id = $1
              AND ($2::text IS NULL OR recommendation = $2)
            ORDER BY {order}
            LIMIT $3
            "#
        );

        let rows = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(query.status.recommendation().map(|r| r.as_str()))
            .bind(query.limit.map(|l| l.max(0)))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_screening(
        &self,
        user_id: Uuid,
        screening_id: Uuid,
    ) -> Result<Option<ScreeningRow>, AppError> {
        let row = sqlx::query_as("SELECT * FROM screenings WHERE id = $1 AND user_id = $2")
            .bind(screening_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_result;

    #[test]
    fn test_new_screening_defaults() {
        let result = sample_result(91);
        let screening = NewScreening::from_result(
            Uuid::nil(),
            &result,
            "Senior Engineer\nSQL required",
            "5 years SQL experience",
        );
        assert_eq!(screening.candidate_name, UNKNOWN_CANDIDATE);
        assert_eq!(screening.candidate_email, None);
        assert_eq!(screening.position_title, "Senior Engineer");
        assert_eq!(screening.recommendation.as_deref(), Some("Interview"));
        assert_eq!(screening.details, serde_json::json!([]));
        assert_eq!(screening.raw_resume, "5 years SQL experience");
    }

    #[test]
    fn test_new_screening_keeps_candidate_contact() {
        let mut result = sample_result(40);
        result.candidate_name = Some(" Jane Doe ".to_string());
        result.candidate_email = Some("jane@example.com".to_string());
        let screening = NewScreening::from_result(Uuid::nil(), &result, "Role: QA", "cv");
        assert_eq!(screening.candidate_name, "Jane Doe");
        assert_eq!(screening.candidate_email.as_deref(), Some("jane@example.com"));
        assert_eq!(screening.position_title, "QA");
    }

    #[test]
    fn test_query_string_defaults() {
        let query: ScreeningQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.status, StatusFilter::All);
        assert_eq!(query.sort_by, SortBy::Date);
        assert_eq!(query.limit, None);

        let query: ScreeningQuery = serde_json::from_value(serde_json::json!({
            "status": "reject", "sort_by": "score", "limit": 5
        }))
        .unwrap();
        assert_eq!(query.status.recommendation(), Some(Recommendation::Reject));
        assert_eq!(query.sort_by, SortBy::Score);
        assert_eq!(query.limit, Some(5));
    }
}
