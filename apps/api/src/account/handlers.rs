use axum::{extract::State, Json};
use serde::Serialize;

use crate::account::profile::{Profile, ProfileUpdate};
use crate::account::settings::UserSettings;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: UserSettings,
    pub smtp_configured: bool,
}

impl From<UserSettings> for SettingsResponse {
    fn from(settings: UserSettings) -> Self {
        let smtp_configured = settings.provider_config.smtp.is_configured();
        Self {
            settings,
            smtp_configured,
        }
    }
}

/// GET /api/v1/settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = state
        .settings
        .get_settings(identity.user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(settings.into()))
}

/// PUT /api/v1/settings
pub async fn handle_put_settings(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(settings): Json<UserSettings>,
) -> Result<Json<SettingsResponse>, AppError> {
    settings.validate()?;
    state
        .settings
        .upsert_settings(identity.user_id, &settings)
        .await?;
    Ok(Json(settings.into()))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .profiles
        .get_profile(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", identity.user_id)))?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(mut update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    if update.email.is_none() {
        update.email = identity.email.clone();
    }
    let profile = state.profiles.upsert_profile(identity.user_id, update).await?;
    Ok(Json(profile))
}
