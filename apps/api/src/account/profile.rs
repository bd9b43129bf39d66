use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;

pub const DEFAULT_ROLE: &str = "Talent Acquisition";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            avatar_url: row.avatar_url,
            role: row.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl ProfileUpdate {
    /// Trims fields and applies the default role. A blank name is rejected.
    pub fn normalize(self) -> Result<Self, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Profile name must not be empty".to_string()));
        }
        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(Self {
            name,
            email: trimmed(self.email),
            avatar_url: trimmed(self.avatar_url),
            role: Some(trimmed(self.role).unwrap_or_else(|| DEFAULT_ROLE.to_string())),
        })
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Creates or updates the caller's profile. The first write also creates the
    /// user's default settings row; existing settings are left alone.
    async fn upsert_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Profile, AppError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn upsert_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Profile, AppError> {
        let update = update.normalize()?;
        let mut tx = self.pool.begin().await?;

        let row: ProfileRow = sqlx::query_as(
            r#"
            INSERT INTO profiles (id, name, email, avatar_url, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
               SET name = EXCLUDED.name,
                   email = EXCLUDED.email,
                   avatar_url = EXCLUDED.avatar_url,
                   role = EXCLUDED.role,
                   updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.avatar_url)
        .bind(update.role.as_deref().unwrap_or(DEFAULT_ROLE))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO settings (user_id, active_provider, provider_config)
            VALUES ($1, 'openai', '{"providers": {}}'::jsonb)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Saved profile for user {user_id}");
        Ok(row.into())
    }
}
