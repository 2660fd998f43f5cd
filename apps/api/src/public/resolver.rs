use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::store::{self, LedgerRef};
use crate::locked::manager;
use crate::models::version::VersionRow;

async fn owner_id_by_username(pool: &PgPool, username: &str) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM owners WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Unknown owner and owner-without-versions both collapse into the same
/// not-found outcome; the resolver never returns a partial record.
async fn main_ledger(
    pool: &PgPool,
    username: &str,
    missing: &str,
) -> Result<LedgerRef, AppError> {
    let owner_id = owner_id_by_username(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound(missing.to_string()))?;
    let resume_id = store::resume_ledger_id(pool, owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(missing.to_string()))?;
    Ok(LedgerRef::resume(resume_id))
}

async fn locked_ledger(
    pool: &PgPool,
    username: &str,
    profile_name: &str,
    missing: &str,
) -> Result<LedgerRef, AppError> {
    let owner_id = owner_id_by_username(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound(missing.to_string()))?;
    let profile = manager::find_profile(pool, owner_id, profile_name)
        .await?
        .ok_or_else(|| AppError::NotFound(missing.to_string()))?;
    Ok(LedgerRef::locked(profile.id))
}

/// `GET /{owner}` — floating link to the current master.
pub async fn resolve_master(pool: &PgPool, username: &str) -> Result<VersionRow, AppError> {
    let ledger = main_ledger(pool, username, "Resume not found").await?;
    store::get_master(pool, ledger)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

/// `GET /{owner}/{version}` — permanent link, resolves regardless of master
/// or archived state.
pub async fn resolve_version(
    pool: &PgPool,
    username: &str,
    version_number: i32,
) -> Result<VersionRow, AppError> {
    let ledger = main_ledger(pool, username, "Resume version not found").await?;
    store::get_version(pool, ledger, version_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume version not found".to_string()))
}

/// `GET /{owner}/v/{profile}` — floating link to the locked ledger's master.
pub async fn resolve_locked_master(
    pool: &PgPool,
    username: &str,
    profile_name: &str,
) -> Result<VersionRow, AppError> {
    let ledger = locked_ledger(pool, username, profile_name, "Locked profile not found").await?;
    store::get_master(pool, ledger)
        .await?
        .ok_or_else(|| AppError::NotFound("Locked profile not found".to_string()))
}

/// `GET /{owner}/v/{profile}/{version}` — permanent locked-ledger link.
pub async fn resolve_locked_version(
    pool: &PgPool,
    username: &str,
    profile_name: &str,
    version_number: i32,
) -> Result<VersionRow, AppError> {
    let ledger =
        locked_ledger(pool, username, profile_name, "Locked profile version not found").await?;
    store::get_version(pool, ledger, version_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Locked profile version not found".to_string()))
}
