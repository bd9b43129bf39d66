//! Identity: resolves a bearer credential into the authenticated user.
//!
//! The hosted auth service owns sign-up, sign-in and sessions. This module only
//! verifies the access token the browser already holds and exposes the result to
//! handlers through the `AuthUser` extractor.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated caller. `access_token` is forwarded to the workflow webhook.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub access_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token. Unknown or expired tokens are `AppError::Unauthorized`.
    async fn resolve(&self, access_token: &str) -> Result<Identity, AppError>;
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
}

/// Verifies tokens against `GET {SUPABASE_URL}/auth/v1/user`.
#[derive(Clone)]
pub struct SupabaseIdentity {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentity {
    pub fn new(base_url: String, anon_key: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url,
            anon_key,
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn resolve(&self, access_token: &str) -> Result<Identity, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .context("auth service unreachable")?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Auth service rejected access token");
                return Err(AppError::Unauthorized);
            }
            status => {
                warn!("Auth service returned {status}");
                return Err(AppError::Internal(anyhow::anyhow!(
                    "auth service returned {status}"
                )));
            }
        }

        let user: SupabaseUser = response
            .json()
            .await
            .context("auth service returned an unexpected user payload")?;

        Ok(Identity {
            user_id: user.id,
            email: user.email,
            access_token: access_token.to_string(),
        })
    }
}

/// Extractor for routes that require a signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let identity = state.identity.resolve(token).await?;
        Ok(AuthUser(identity))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
