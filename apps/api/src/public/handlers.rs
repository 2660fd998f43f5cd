use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::analytics::events::{spawn_record, ResumeKind, ViewEvent, ViewMeta};
use crate::errors::AppError;
use crate::models::version::VersionRow;
use crate::public::resolver;
use crate::state::AppState;

fn track(
    state: &AppState,
    headers: &HeaderMap,
    username: String,
    kind: ResumeKind,
    profile_name: Option<String>,
    version_number: Option<i32>,
) {
    spawn_record(
        state.db.clone(),
        ViewEvent {
            username,
            kind,
            profile_name,
            version_number,
            meta: ViewMeta::from_headers(headers),
        },
    );
}

/// GET /public/:username
pub async fn handle_master(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<VersionRow>, AppError> {
    let version = resolver::resolve_master(&state.db, &username).await?;
    track(&state, &headers, username, ResumeKind::Master, None, None);
    Ok(Json(version))
}

/// GET /public/:username/:version
pub async fn handle_version(
    State(state): State<AppState>,
    Path((username, version_number)): Path<(String, i32)>,
    headers: HeaderMap,
) -> Result<Json<VersionRow>, AppError> {
    let version = resolver::resolve_version(&state.db, &username, version_number).await?;
    track(
        &state,
        &headers,
        username,
        ResumeKind::Master,
        None,
        Some(version_number),
    );
    Ok(Json(version))
}

/// GET /public/:username/v/:profile_name
pub async fn handle_locked_master(
    State(state): State<AppState>,
    Path((username, profile_name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<VersionRow>, AppError> {
    let version = resolver::resolve_locked_master(&state.db, &username, &profile_name).await?;
    track(
        &state,
        &headers,
        username,
        ResumeKind::Locked,
        Some(profile_name),
        None,
    );
    Ok(Json(version))
}

/// GET /public/:username/v/:profile_name/:version
pub async fn handle_locked_version(
    State(state): State<AppState>,
    Path((username, profile_name, version_number)): Path<(String, String, i32)>,
    headers: HeaderMap,
) -> Result<Json<VersionRow>, AppError> {
    let version =
        resolver::resolve_locked_version(&state.db, &username, &profile_name, version_number)
            .await?;
    track(
        &state,
        &headers,
        username,
        ResumeKind::Locked,
        Some(profile_name),
        Some(version_number),
    );
    Ok(Json(version))
}
