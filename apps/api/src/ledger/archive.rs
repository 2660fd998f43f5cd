use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::store::{find_owned_version, lock_ledger, set_transaction_budgets, LedgerRef};

/// Archival is a visibility toggle, never a deletion. The live version can
/// never be archived; everything else can, and doing it twice is a no-op.
pub async fn archive_version(
    pool: &PgPool,
    owner_id: Uuid,
    version_id: Uuid,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    set_transaction_budgets(&mut tx).await?;

    let target_ref = find_owned_version(&mut tx, version_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

    if target_ref.owner_id != owner_id {
        return Err(AppError::Forbidden);
    }

    // Hold the ledger lock so a concurrent restore cannot promote this
    // version to master between the check and the update.
    lock_ledger(&mut tx, LedgerRef::resume(target_ref.resume_id)).await?;

    let is_master: bool = sqlx::query_scalar("SELECT is_master FROM resume_versions WHERE id = $1")
        .bind(version_id)
        .fetch_one(&mut *tx)
        .await?;

    if is_master {
        return Err(AppError::BadRequest(
            "Cannot archive the live version. Create a new version first.".to_string(),
        ));
    }

    sqlx::query("UPDATE resume_versions SET is_archived = true WHERE id = $1")
        .bind(version_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Archived version {version_id} for owner {owner_id}");
    Ok(())
}
