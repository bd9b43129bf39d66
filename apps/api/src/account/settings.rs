//! Per-user scoring provider and SMTP settings.
//!
//! Stored providers replace the defaults one provider at a time: a saved `openai`
//! block wins over the default `openai` block, and providers that were never saved
//! keep their defaults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::settings::SettingsRow;

pub const DEFAULT_PROVIDER: &str = "openai";

pub const KNOWN_PROVIDERS: &[&str] = &["openai", "perplexity", "gemini", "custom"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_provider")]
    pub active_provider: String,
    #[serde(default)]
    pub provider_config: ProviderConfig,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            active_provider: default_provider(),
            provider_config: ProviderConfig::default(),
        }
    }
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub providers: Providers,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Providers {
    pub openai: ProviderSettings,
    pub perplexity: ProviderSettings,
    pub gemini: ProviderSettings,
    pub custom: CustomProviderSettings,
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::with_model("gpt-4-turbo"),
            perplexity: ProviderSettings::with_model("sonar-pro"),
            gemini: ProviderSettings::with_model("gemini-pro"),
            custom: CustomProviderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
}

impl ProviderSettings {
    fn with_model(model: &str) -> Self {
        Self {
            api_key: String::new(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomProviderSettings {
    pub api_key: String,
    pub model: String,
    pub url: String,
    pub api_key_header: String,
    pub api_key_prefix: String,
}

impl Default for CustomProviderSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: String::new(),
            url: String::new(),
            api_key_header: "Authorization".to_string(),
            api_key_prefix: "Bearer ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: "587".to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }
}

impl UserSettings {
    /// Builds settings from a stored row, filling anything missing from defaults.
    /// An unreadable `provider_config` falls back to the defaults.
    pub fn from_row(row: SettingsRow) -> Self {
        let provider_config = match row.provider_config {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Stored provider_config for user {} is malformed: {e}", row.user_id);
                ProviderConfig::default()
            }),
            None => ProviderConfig::default(),
        };
        Self {
            active_provider: row
                .active_provider
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(default_provider),
            provider_config,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !KNOWN_PROVIDERS.contains(&self.active_provider.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown provider '{}'. Expected one of: {}",
                self.active_provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }
        let port = self.provider_config.smtp.port.trim();
        if !port.is_empty() && port.parse::<u16>().is_err() {
            return Err(AppError::Validation(format!(
                "SMTP port must be a number between 0 and 65535, got '{port}'"
            )));
        }
        Ok(())
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>, AppError>;

    async fn upsert_settings(&self, user_id: Uuid, settings: &UserSettings) -> Result<(), AppError>;
}

pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>, AppError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT user_id, active_provider, provider_config FROM settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserSettings::from_row))
    }

    async fn upsert_settings(&self, user_id: Uuid, settings: &UserSettings) -> Result<(), AppError> {
        let provider_config = serde_json::to_value(&settings.provider_config)
            .map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO settings (user_id, active_provider, provider_config, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
               SET active_provider = EXCLUDED.active_provider,
                   provider_config = EXCLUDED.provider_config,
                   updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(&settings.active_provider)
        .bind(provider_config)
        .execute(&self.pool)
        .await?;

        info!("Saved settings for user {user_id} (provider: {})", settings.active_provider);
        Ok(())
    }
}

/// The provider to request scoring from. Falls back to `openai` when the user has no
/// settings row or it cannot be read.
pub async fn resolve_provider(store: &dyn SettingsStore, user_id: Uuid) -> String {
    match store.get_settings(user_id).await {
        Ok(Some(settings)) => settings.active_provider,
        Ok(None) => default_provider(),
        Err(e) => {
            warn!("Error fetching settings for user {user_id}, using {DEFAULT_PROVIDER}: {e}");
            default_provider()
        }
    }
}
