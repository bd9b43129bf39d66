use axum::Json;
use serde_json::{json, Value};

use crate::extract::ACCEPTED_EXTENSIONS;

/// GET /health
/// Returns a simple status object with service version and the upload formats the
/// extractor understands.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screener-api",
        "accepted_extensions": ACCEPTED_EXTENSIONS
    }))
}
