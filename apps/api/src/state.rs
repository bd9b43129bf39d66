use std::sync::Arc;

use crate::account::profile::ProfileStore;
use crate::account::settings::SettingsStore;
use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::history::store::ScreeningStore;
use crate::screening::scorer::Scorer;
use crate::webhook::WebhookClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; collaborators are trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `WebhookScorer` in production, `MockScorer` when `USE_MOCK=true`.
    pub scorer: Arc<dyn Scorer>,
    pub screenings: Arc<dyn ScreeningStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Outreach actions (email, calendar) share the scoring workflow's endpoint.
    pub webhook: WebhookClient,
}
