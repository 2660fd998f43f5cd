use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::locked::manager::{self, ProfileWithLatest};
use crate::models::profile::LockedProfileRow;
use crate::models::version::{VersionRow, VersionSummary};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub owner_id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
pub struct CreateProfileResponse {
    pub profile: LockedProfileRow,
    pub version: VersionRow,
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

#[derive(Deserialize)]
pub struct OwnerBody {
    pub owner_id: Uuid,
}

/// POST /locked-profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<CreateProfileResponse>, AppError> {
    let (profile, version) = manager::create_profile(&state.db, req.owner_id, &req.name).await?;
    Ok(Json(CreateProfileResponse { profile, version }))
}

/// GET /locked-profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ProfileWithLatest>>, AppError> {
    let profiles = manager::list_profiles(&state.db, query.owner_id).await?;
    Ok(Json(profiles))
}

/// POST /locked-profiles/:profile_name/version
pub async fn handle_refresh_profile(
    State(state): State<AppState>,
    Path(profile_name): Path<String>,
    Json(body): Json<OwnerBody>,
) -> Result<Json<VersionRow>, AppError> {
    let version = manager::refresh_profile(&state.db, body.owner_id, &profile_name).await?;
    Ok(Json(version))
}

/// GET /locked-profiles/:profile_name/versions
pub async fn handle_list_profile_versions(
    State(state): State<AppState>,
    Path(profile_name): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<VersionSummary>>, AppError> {
    let versions =
        manager::list_profile_versions(&state.db, query.owner_id, &profile_name).await?;
    Ok(Json(versions))
}
