use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::store::{self, LedgerRef};
use crate::locked::manager;
use crate::render::renderer_for;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExportMasterRequest {
    pub owner_id: Uuid,
    pub template: Option<String>,
    /// Unsaved editor content may be exported directly; otherwise the current
    /// master is fetched.
    pub content: Option<Value>,
}

#[derive(Deserialize)]
pub struct ExportLockedRequest {
    pub owner_id: Uuid,
    pub template: Option<String>,
}

fn document_response(filename: &str, body: Bytes) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /export/master
pub async fn handle_export_master(
    State(state): State<AppState>,
    Json(req): Json<ExportMasterRequest>,
) -> Result<Response, AppError> {
    let content = match req.content {
        Some(content) => content,
        None => {
            let resume_id = store::resume_ledger_id(&state.db, req.owner_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
            store::get_master(&state.db, LedgerRef::resume(resume_id))
                .await?
                .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?
                .content
        }
    };

    let renderer = renderer_for(req.template.as_deref());
    let body = renderer.render(&content).await?;
    Ok(document_response("resume.txt", body))
}

/// POST /export/locked/:profile_name
pub async fn handle_export_locked(
    State(state): State<AppState>,
    Path(profile_name): Path<String>,
    Json(req): Json<ExportLockedRequest>,
) -> Result<Response, AppError> {
    let profile = manager::find_profile(&state.db, req.owner_id, &profile_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Locked profile not found".to_string()))?;
    let master = store::get_master(&state.db, LedgerRef::locked(profile.id))
        .await?
        .ok_or_else(|| AppError::NotFound("Locked profile not found".to_string()))?;

    let renderer = renderer_for(req.template.as_deref());
    let body = renderer.render(&master.content).await?;
    Ok(document_response(&format!("{profile_name}-resume.txt"), body))
}
