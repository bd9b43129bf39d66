use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::history::export::{export_csv, export_file_name};
use crate::history::stats::{compute_stats, HistoryStats};
use crate::history::store::ScreeningQuery;
use crate::models::screening::ScreeningRow;
use crate::state::AppState;

/// GET /api/v1/screenings
pub async fn handle_list_screenings(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(query): Query<ScreeningQuery>,
) -> Result<Json<Vec<ScreeningRow>>, AppError> {
    let rows = state
        .screenings
        .list_screenings(identity.user_id, &query)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/screenings/stats
pub async fn handle_screening_stats(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<HistoryStats>, AppError> {
    let rows = state
        .screenings
        .list_screenings(identity.user_id, &ScreeningQuery::default())
        .await?;
    Ok(Json(compute_stats(&rows)))
}

/// GET /api/v1/screenings/export
pub async fn handle_export_screenings(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(query): Query<ScreeningQuery>,
) -> Result<Response, AppError> {
    let rows = state
        .screenings
        .list_screenings(identity.user_id, &query)
        .await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("No screenings to export".to_string()));
    }

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(Utc::now()));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export_csv(&rows),
    )
        .into_response())
}
