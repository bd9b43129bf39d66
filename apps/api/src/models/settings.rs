use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SettingsRow {
    pub user_id: Uuid,
    pub active_provider: Option<String>,
    pub provider_config: Option<Value>,
}
