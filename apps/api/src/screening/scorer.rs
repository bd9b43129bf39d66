//! Remote scoring and the per-request screening session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::account::settings::{resolve_provider, SettingsStore};
use crate::auth::Identity;
use crate::errors::AppError;
use crate::history::store::{NewScreening, ScreeningStore};
use crate::screening::batch::Analyzer;
use crate::screening::models::{parse_scoring_response, ScreeningResult};
use crate::webhook::WebhookClient;

/// Everything the scoring workflow needs for one (job description, resume) pair.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    pub job_description: &'a str,
    pub resume: &'a str,
    pub provider: &'a str,
    pub user_id: Uuid,
    pub access_token: Option<&'a str>,
}

#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, request: &ScoringRequest<'_>) -> Result<ScreeningResult, AppError>;
}

/// Scores through the automation workflow's `analyze` action.
pub struct WebhookScorer {
    client: WebhookClient,
}

impl WebhookScorer {
    pub fn new(client: WebhookClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Scorer for WebhookScorer {
    async fn score(&self, request: &ScoringRequest<'_>) -> Result<ScreeningResult, AppError> {
        let body = self
            .client
            .analyze(
                request.access_token,
                request.user_id,
                request.provider,
                request.job_description,
                request.resume,
            )
            .await?;
        parse_scoring_response(body)
    }
}

/// Returns a fixed sample verdict after `delay`. For running without the workflow.
pub struct MockScorer {
    delay: Duration,
}

impl MockScorer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn mock_response() -> Value {
    json!({
        "score": 88,
        "summary": "Candidate shows strong alignment with the Product Manager role. Key strengths include 5+ years of Agile experience and a background in SaaS. However, they lack specific experience with SQL as requested in the JD.",
        "recommendation": "Interview",
        "details": [
            { "criteria": "Experience", "status": "match", "reason": "7 years in Product Management" },
            { "criteria": "Tech Stack", "status": "partial", "reason": "Familiar with Jira, but no SQL" },
            { "criteria": "Education", "status": "match", "reason": "MBA from Top Tier University" }
        ],
        "candidateName": "John Doe",
        "candidateEmail": "john.doe@example.com"
    })
}

#[async_trait]
impl Scorer for MockScorer {
    async fn score(&self, _request: &ScoringRequest<'_>) -> Result<ScreeningResult, AppError> {
        tokio::time::sleep(self.delay).await;
        parse_scoring_response(mock_response())
    }
}

/// One user's screening context: who is asking, which provider to use, and where
/// successful results are recorded.
#[derive(Clone)]
pub struct ScreeningSession {
    scorer: Arc<dyn Scorer>,
    store: Arc<dyn ScreeningStore>,
    identity: Identity,
    provider: String,
}

impl ScreeningSession {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        store: Arc<dyn ScreeningStore>,
        identity: Identity,
        provider: String,
    ) -> Self {
        Self {
            scorer,
            store,
            identity,
            provider,
        }
    }

    /// Looks up the caller's active provider, defaulting to `openai`.
    pub async fn open(
        scorer: Arc<dyn Scorer>,
        store: Arc<dyn ScreeningStore>,
        settings: &dyn SettingsStore,
        identity: Identity,
    ) -> Self {
        let provider = resolve_provider(settings, identity.user_id).await;
        Self::new(scorer, store, identity, provider)
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Records a result on a detached task. A failed save is logged and never
    /// reaches the caller.
    fn persist_in_background(&self, result: &ScreeningResult, job_description: &str, resume: &str) {
        let store = self.store.clone();
        let screening =
            NewScreening::from_result(self.identity.user_id, result, job_description, resume);
        tokio::spawn(async move {
            if let Err(e) = store.save_screening(screening).await {
                error!("Error saving screening: {e}");
            }
        });
    }
}

#[async_trait]
impl Analyzer for ScreeningSession {
    async fn analyze(&self, job_description: &str, resume: &str) -> Result<ScreeningResult, AppError> {
        let request = ScoringRequest {
            job_description,
            resume,
            provider: &self.provider,
            user_id: self.identity.user_id,
            access_token: Some(&self.identity.access_token),
        };
        let result = self.scorer.score(&request).await?;
        info!(
            score = result.score,
            provider = %self.provider,
            "Candidate analyzed"
        );

        self.persist_in_background(&result, job_description, resume);
        Ok(result)
    }
}
