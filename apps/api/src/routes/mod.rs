pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::account::handlers as account;
use crate::history::handlers as history;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Screening
        .route(
            "/api/v1/screenings/analyze",
            post(screening::handle_analyze),
        )
        .route("/api/v1/screenings/batch", post(screening::handle_batch))
        .route(
            "/api/v1/screenings/batch/stream",
            post(screening::handle_batch_stream),
        )
        .route(
            "/api/v1/screenings/:id/email",
            post(screening::handle_send_email),
        )
        .route(
            "/api/v1/screenings/:id/schedule",
            post(screening::handle_schedule_interview),
        )
        // History
        .route("/api/v1/screenings", get(history::handle_list_screenings))
        .route(
            "/api/v1/screenings/stats",
            get(history::handle_screening_stats),
        )
        .route(
            "/api/v1/screenings/export",
            get(history::handle_export_screenings),
        )
        // Account
        .route(
            "/api/v1/settings",
            get(account::handle_get_settings).put(account::handle_put_settings),
        )
        .route(
            "/api/v1/profile",
            get(account::handle_get_profile).put(account::handle_put_profile),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
