use anyhow::{Context, Result};

use crate::webhook::DEFAULT_WEBHOOK_URL;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub scoring_webhook_url: String,
    /// Serve a canned scoring result instead of calling the workflow.
    pub use_mock: bool,
    pub mock_delay_ms: u64,
    pub max_upload_bytes: usize,
    pub run_migrations: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            supabase_url: require_env("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            scoring_webhook_url: std::env::var("SCORING_WEBHOOK_URL")
                .unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string()),
            use_mock: flag_env("USE_MOCK"),
            mock_delay_ms: parse_env("MOCK_DELAY_MS", 2000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            run_migrations: flag_env("RUN_MIGRATIONS"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Only the literal `true` (any case) enables a flag.
fn flag_env(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
