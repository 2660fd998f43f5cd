use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::store::{self, LedgerRef};
use crate::models::profile::LockedProfileRow;
use crate::models::version::{VersionRow, VersionSummary};

/// A profile with its most recent version, for listing.
#[derive(Debug, Serialize)]
pub struct ProfileWithLatest {
    #[serde(flatten)]
    pub profile: LockedProfileRow,
    pub latest_version: Option<VersionSummary>,
}

pub async fn find_profile(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
) -> Result<Option<LockedProfileRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, owner_id, name, created_at FROM locked_profiles \
         WHERE owner_id = $1 AND name = $2",
    )
    .bind(owner_id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// The owner's current main-ledger master content, copied by value.
/// Deliberately read outside the locked ledger's write transaction: the two
/// ledgers are separate consistency domains (momentary staleness is fine).
async fn current_master_content(pool: &PgPool, owner_id: Uuid) -> Result<Option<Value>, AppError> {
    let Some(resume_id) = store::resume_ledger_id(pool, owner_id).await? else {
        return Ok(None);
    };
    let master = store::get_master(pool, LedgerRef::resume(resume_id)).await?;
    Ok(master.map(|v| v.content))
}

/// Creates a named locked profile seeded from the current master content as
/// version 1.
pub async fn create_profile(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
) -> Result<(LockedProfileRow, VersionRow), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Profile name is required".to_string()));
    }

    let content = current_master_content(pool, owner_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("No master resume found to lock".to_string()))?;

    let mut tx = pool.begin().await?;
    store::set_transaction_budgets(&mut tx).await?;

    let profile: LockedProfileRow = sqlx::query_as(
        "INSERT INTO locked_profiles (id, owner_id, name) VALUES ($1, $2, $3) \
         RETURNING id, owner_id, name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::from_db(e, "Profile name already exists"))?;

    let version =
        store::append_master_version(&mut tx, LedgerRef::locked(profile.id), &content).await?;
    tx.commit().await?;

    info!("Created locked profile '{name}' for owner {owner_id}");
    Ok((profile, version))
}

/// Refreshes a locked profile: appends the CURRENT master content as a new
/// version in the locked ledger, following the same master-transition step as
/// the main ledger. Never copies from inside the locked ledger itself.
pub async fn refresh_profile(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
) -> Result<VersionRow, AppError> {
    let profile = find_profile(pool, owner_id, name)
        .await?
        .ok_or_else(|| AppError::NotFound("Locked profile not found".to_string()))?;

    let content = current_master_content(pool, owner_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("No master resume found to snapshot".to_string()))?;

    let ledger = LedgerRef::locked(profile.id);
    let mut tx = pool.begin().await?;
    store::set_transaction_budgets(&mut tx).await?;
    store::lock_ledger(&mut tx, ledger).await?;
    let version = store::append_master_version(&mut tx, ledger, &content).await?;
    tx.commit().await?;

    info!(
        "Refreshed locked profile '{name}' for owner {owner_id} to version {}",
        version.version_number
    );
    Ok(version)
}

pub async fn list_profiles(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<ProfileWithLatest>, AppError> {
    let profiles: Vec<LockedProfileRow> = sqlx::query_as(
        "SELECT id, owner_id, name, created_at FROM locked_profiles \
         WHERE owner_id = $1 ORDER BY created_at",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let latest_version: Option<VersionSummary> = sqlx::query_as(
            "SELECT id, version_number, is_master, is_archived, created_at \
             FROM locked_profile_versions WHERE locked_profile_id = $1 \
             ORDER BY version_number DESC LIMIT 1",
        )
        .bind(profile.id)
        .fetch_optional(pool)
        .await?;
        result.push(ProfileWithLatest {
            profile,
            latest_version,
        });
    }
    Ok(result)
}

pub async fn list_profile_versions(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
) -> Result<Vec<VersionSummary>, AppError> {
    let profile = find_profile(pool, owner_id, name)
        .await?
        .ok_or_else(|| AppError::NotFound("Locked profile not found".to_string()))?;

    store::list_versions(pool, LedgerRef::locked(profile.id), false).await
}
