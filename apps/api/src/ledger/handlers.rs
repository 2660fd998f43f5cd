use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::archive::archive_version;
use crate::ledger::store::{self, LedgerRef};
use crate::models::version::{VersionRow, VersionSummary};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateVersionRequest {
    pub owner_id: Uuid,
    pub content: Value,
}

#[derive(Deserialize)]
pub struct VersionListQuery {
    pub owner_id: Uuid,
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Deserialize)]
pub struct OwnerBody {
    pub owner_id: Uuid,
}

/// POST /resume/version
/// Shape validation happens upstream; only presence is checked here.
pub async fn handle_create_version(
    State(state): State<AppState>,
    Json(req): Json<CreateVersionRequest>,
) -> Result<Json<VersionRow>, AppError> {
    if req.content.is_null() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }
    let version = store::create_version(&state.db, req.owner_id, &req.content).await?;
    Ok(Json(version))
}

/// GET /resume/versions
pub async fn handle_list_versions(
    State(state): State<AppState>,
    Query(query): Query<VersionListQuery>,
) -> Result<Json<Vec<VersionSummary>>, AppError> {
    // No ledger yet means an empty history, not an error.
    let Some(resume_id) = store::resume_ledger_id(&state.db, query.owner_id).await? else {
        return Ok(Json(Vec::new()));
    };
    let versions = store::list_versions(
        &state.db,
        LedgerRef::resume(resume_id),
        query.include_archived,
    )
    .await?;
    Ok(Json(versions))
}

/// PUT /resume/version/:id/archive
pub async fn handle_archive_version(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
    Json(body): Json<OwnerBody>,
) -> Result<Json<Value>, AppError> {
    archive_version(&state.db, body.owner_id, version_id).await?;
    Ok(Json(json!({ "message": "Version archived successfully" })))
}

/// POST /resume/version/:id/set-live
pub async fn handle_set_live(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
    Json(body): Json<OwnerBody>,
) -> Result<Json<VersionRow>, AppError> {
    let version = store::set_live(&state.db, body.owner_id, version_id).await?;
    Ok(Json(version))
}
