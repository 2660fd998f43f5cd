use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analytics::reports::{self, AnalyticsDetails, AnalyticsSummary, TimelinePoint};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

/// Events are keyed by username, so the owner id is resolved first.
async fn username_for_owner(pool: &PgPool, owner_id: Uuid) -> Result<String, AppError> {
    let username: Option<String> = sqlx::query_scalar("SELECT username FROM owners WHERE id = $1")
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    username.ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// GET /analytics/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let username = username_for_owner(&state.db, query.owner_id).await?;
    Ok(Json(reports::summary(&state.db, &username).await?))
}

/// GET /analytics/timeline
pub async fn handle_timeline(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<TimelinePoint>>, AppError> {
    let username = username_for_owner(&state.db, query.owner_id).await?;
    Ok(Json(reports::timeline(&state.db, &username).await?))
}

/// GET /analytics/details
pub async fn handle_details(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<AnalyticsDetails>, AppError> {
    let username = username_for_owner(&state.db, query.owner_id).await?;
    Ok(Json(reports::details(&state.db, &username).await?))
}
