mod account;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod history;
mod models;
mod routes;
mod screening;
mod state;
mod webhook;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::account::profile::PgProfileStore;
use crate::account::settings::PgSettingsStore;
use crate::auth::SupabaseIdentity;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::history::store::PgScreeningStore;
use crate::routes::build_router;
use crate::screening::scorer::{MockScorer, Scorer, WebhookScorer};
use crate::state::AppState;
use crate::webhook::WebhookClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    if config.run_migrations {
        run_migrations(&db).await?;
    }

    // Workflow webhook: scoring, email, calendar
    let webhook = WebhookClient::new(config.scoring_webhook_url.clone());
    let scorer: Arc<dyn Scorer> = if config.use_mock {
        warn!(
            "USE_MOCK=true: serving canned scoring results after {}ms",
            config.mock_delay_ms
        );
        Arc::new(MockScorer::new(Duration::from_millis(config.mock_delay_ms)))
    } else {
        info!("Scoring via workflow webhook at {}", webhook.url());
        Arc::new(WebhookScorer::new(webhook.clone()))
    };

    let identity = SupabaseIdentity::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    )?;
    info!("Identity provider initialized ({})", config.supabase_url);

    // Build app state
    let state = AppState {
        config: config.clone(),
        scorer,
        screenings: Arc::new(PgScreeningStore::new(db.clone())),
        settings: Arc::new(PgSettingsStore::new(db.clone())),
        profiles: Arc::new(PgProfileStore::new(db)),
        identity: Arc::new(identity),
        webhook,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the front-end origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
