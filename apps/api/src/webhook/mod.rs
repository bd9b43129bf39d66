/// Webhook Client — the single point of entry for all calls to the automation workflow.
///
/// The workflow engine exposes one URL and dispatches on the `action` field of the
/// JSON body: `analyze`, `send_email`, `schedule_interview`.
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5678/webhook/recruit-ai-action";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        if let WebhookError::Api { status, .. } = &e {
            debug!("Workflow webhook answered with HTTP {status}");
        }
        AppError::RemoteScoring(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Interview,
    Rejection,
}

/// Request bodies, tagged by `action`. Field names are camelCase on the wire.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WebhookAction<'a> {
    Analyze {
        jd: &'a str,
        resume: &'a str,
        provider: &'a str,
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    SendEmail {
        user_id: Uuid,
        screening_id: Uuid,
        #[serde(rename = "type")]
        email_type: EmailType,
        timestamp: DateTime<Utc>,
    },
    ScheduleInterview {
        user_id: Uuid,
        screening_id: Uuid,
        datetime: DateTime<FixedOffset>,
        timestamp: DateTime<Utc>,
    },
}

impl WebhookAction<'_> {
    fn name(&self) -> &'static str {
        match self {
            WebhookAction::Analyze { .. } => "analyze",
            WebhookAction::SendEmail { .. } => "send_email",
            WebhookAction::ScheduleInterview { .. } => "schedule_interview",
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookErrorBody {
    error: Option<String>,
}

/// No client-level timeout: a stalled scoring call stalls the caller.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts an action and returns the parsed JSON reply. On a non-success status the
    /// workflow's `{error}` message is surfaced when present, else `fallback(status)`.
    pub async fn post_action(
        &self,
        access_token: Option<&str>,
        action: &WebhookAction<'_>,
        fallback: impl FnOnce(StatusCode) -> String,
    ) -> Result<Value, WebhookError> {
        let mut request = self.client.post(&self.url).json(action);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        debug!(action = action.name(), "Posting to workflow webhook");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WebhookErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback(status));
            return Err(WebhookError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        debug!(action = action.name(), "Workflow webhook replied");
        Ok(body)
    }

    pub async fn analyze(
        &self,
        access_token: Option<&str>,
        user_id: Uuid,
        provider: &str,
        jd: &str,
        resume: &str,
    ) -> Result<Value, WebhookError> {
        let action = WebhookAction::Analyze {
            jd,
            resume,
            provider,
            user_id,
            timestamp: Utc::now(),
        };
        self.post_action(access_token, &action, |status| {
            format!("HTTP {}: Failed to analyze candidate", status.as_u16())
        })
        .await
    }

    pub async fn send_email(
        &self,
        access_token: Option<&str>,
        user_id: Uuid,
        screening_id: Uuid,
        email_type: EmailType,
    ) -> Result<Value, WebhookError> {
        let action = WebhookAction::SendEmail {
            user_id,
            screening_id,
            email_type,
            timestamp: Utc::now(),
        };
        self.post_action(access_token, &action, |_| "Failed to send email".to_string())
            .await
    }

    pub async fn schedule_interview(
        &self,
        access_token: Option<&str>,
        user_id: Uuid,
        screening_id: Uuid,
        datetime: DateTime<FixedOffset>,
    ) -> Result<Value, WebhookError> {
        let action = WebhookAction::ScheduleInterview {
            user_id,
            screening_id,
            datetime,
            timestamp: Utc::now(),
        };
        self.post_action(access_token, &action, |_| {
            "Failed to schedule interview".to_string()
        })
        .await
    }
}
