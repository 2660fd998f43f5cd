use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::version::{VersionRow, VersionSummary};

/// Which versions table a ledger lives in. The store logic is identical for
/// both; only table and foreign-key names differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Resume,
    LockedProfile,
}

impl LedgerKind {
    pub const fn versions_table(self) -> &'static str {
        match self {
            LedgerKind::Resume => "resume_versions",
            LedgerKind::LockedProfile => "locked_profile_versions",
        }
    }

    pub const fn parent_table(self) -> &'static str {
        match self {
            LedgerKind::Resume => "resumes",
            LedgerKind::LockedProfile => "locked_profiles",
        }
    }

    pub const fn parent_column(self) -> &'static str {
        match self {
            LedgerKind::Resume => "resume_id",
            LedgerKind::LockedProfile => "locked_profile_id",
        }
    }
}

/// Handle to one concrete ledger (main resume or locked profile).
#[derive(Debug, Clone, Copy)]
pub struct LedgerRef {
    pub kind: LedgerKind,
    pub id: Uuid,
}

impl LedgerRef {
    pub fn resume(id: Uuid) -> Self {
        Self {
            kind: LedgerKind::Resume,
            id,
        }
    }

    pub fn locked(id: Uuid) -> Self {
        Self {
            kind: LedgerKind::LockedProfile,
            id,
        }
    }
}

/// Version numbers start at 1 and are never reused, even across archival.
pub fn next_version_number(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

fn version_columns(kind: LedgerKind) -> String {
    format!(
        "id, {} AS ledger_id, version_number, content, is_master, is_archived, created_at",
        kind.parent_column()
    )
}

/// Bounds queue-wait and total execution of a write transaction so contention
/// fails fast as a retryable error instead of holding locks open.
pub async fn set_transaction_budgets(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SET LOCAL lock_timeout = '5s'")
        .execute(&mut *conn)
        .await?;
    sqlx::query("SET LOCAL statement_timeout = '30s'")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Serializes concurrent writers on the same ledger by locking its parent row.
/// Writers on different ledgers never contend.
pub async fn lock_ledger(conn: &mut PgConnection, ledger: LedgerRef) -> Result<(), AppError> {
    let locked: Option<Uuid> = sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE id = $1 FOR UPDATE",
        ledger.kind.parent_table()
    ))
    .bind(ledger.id)
    .fetch_optional(&mut *conn)
    .await?;

    locked
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Ledger not found".to_string()))
}

/// The master-transition step shared by create, restore-to-live, and locked
/// refresh: read the current max version number, unset the previous master,
/// insert the new version as master. Must run inside a transaction that holds
/// the ledger lock (see `lock_ledger`); everything commits or nothing does.
pub async fn append_master_version(
    conn: &mut PgConnection,
    ledger: LedgerRef,
    content: &Value,
) -> Result<VersionRow, AppError> {
    let table = ledger.kind.versions_table();
    let parent = ledger.kind.parent_column();

    let current_max: Option<i32> = sqlx::query_scalar(&format!(
        "SELECT MAX(version_number) FROM {table} WHERE {parent} = $1"
    ))
    .bind(ledger.id)
    .fetch_one(&mut *conn)
    .await?;

    let new_number = next_version_number(current_max);

    if current_max.is_some() {
        sqlx::query(&format!(
            "UPDATE {table} SET is_master = false WHERE {parent} = $1 AND is_master = true"
        ))
        .bind(ledger.id)
        .execute(&mut *conn)
        .await?;
    }

    let row: VersionRow = sqlx::query_as(&format!(
        "INSERT INTO {table} (id, {parent}, version_number, content, is_master, is_archived) \
         VALUES ($1, $2, $3, $4, true, false) \
         RETURNING {}",
        version_columns(ledger.kind)
    ))
    .bind(Uuid::new_v4())
    .bind(ledger.id)
    .bind(new_number)
    .bind(content)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::from_db(e, "Concurrent write on this ledger, please retry"))?;

    Ok(row)
}

/// Returns the owner's main ledger id, if it exists yet.
pub async fn resume_ledger_id(pool: &PgPool, owner_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM resumes WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// Appends a new version to the owner's main ledger and makes it master,
/// creating the ledger itself on first submission.
pub async fn create_version(
    pool: &PgPool,
    owner_id: Uuid,
    content: &Value,
) -> Result<VersionRow, AppError> {
    let owner_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM owners WHERE id = $1)")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    if !owner_exists {
        return Err(AppError::NotFound(format!("Owner {owner_id} not found")));
    }

    let mut tx = pool.begin().await?;
    set_transaction_budgets(&mut tx).await?;

    sqlx::query("INSERT INTO resumes (id, owner_id) VALUES ($1, $2) ON CONFLICT (owner_id) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    // Locks the ledger row for the rest of the transaction.
    let resume_id: Uuid = sqlx::query_scalar("SELECT id FROM resumes WHERE owner_id = $1 FOR UPDATE")
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

    let row = append_master_version(&mut tx, LedgerRef::resume(resume_id), content).await?;
    tx.commit().await?;

    info!(
        "Created resume version {} for owner {owner_id}",
        row.version_number
    );
    Ok(row)
}

/// History listing, newest first. Archived versions are hidden unless asked
/// for; they never disappear from direct numeric lookup.
pub async fn list_versions(
    pool: &PgPool,
    ledger: LedgerRef,
    include_archived: bool,
) -> Result<Vec<VersionSummary>, AppError> {
    let rows: Vec<VersionSummary> = sqlx::query_as(&format!(
        "SELECT id, version_number, is_master, is_archived, created_at \
         FROM {} WHERE {} = $1 AND ($2 OR NOT is_archived) \
         ORDER BY version_number DESC",
        ledger.kind.versions_table(),
        ledger.kind.parent_column()
    ))
    .bind(ledger.id)
    .bind(include_archived)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Direct numeric addressing. Works regardless of master or archived state:
/// once a version number has been handed out, it resolves forever.
pub async fn get_version(
    pool: &PgPool,
    ledger: LedgerRef,
    version_number: i32,
) -> Result<Option<VersionRow>, AppError> {
    let row: Option<VersionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM {} WHERE {} = $1 AND version_number = $2",
        version_columns(ledger.kind),
        ledger.kind.versions_table(),
        ledger.kind.parent_column()
    ))
    .bind(ledger.id)
    .bind(version_number)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The single live version of a ledger, or None before the first submission.
pub async fn get_master(pool: &PgPool, ledger: LedgerRef) -> Result<Option<VersionRow>, AppError> {
    let row: Option<VersionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM {} WHERE {} = $1 AND is_master = true",
        version_columns(ledger.kind),
        ledger.kind.versions_table(),
        ledger.kind.parent_column()
    ))
    .bind(ledger.id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Ownership lookup for a main-ledger version id.
#[derive(sqlx::FromRow)]
pub(crate) struct OwnedVersionRef {
    pub resume_id: Uuid,
    pub owner_id: Uuid,
}

pub(crate) async fn find_owned_version(
    conn: &mut PgConnection,
    version_id: Uuid,
) -> Result<Option<OwnedVersionRef>, sqlx::Error> {
    sqlx::query_as(
        "SELECT v.resume_id, r.owner_id \
         FROM resume_versions v JOIN resumes r ON r.id = v.resume_id \
         WHERE v.id = $1",
    )
    .bind(version_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Restore-to-live: makes a past version current by copying its content into
/// a brand-new master version. The old version itself is never re-flagged or
/// rewritten, so numbering stays chronological. Restoring an archived version
/// is allowed; the live copy comes back un-archived while the original stays
/// hidden.
pub async fn set_live(
    pool: &PgPool,
    owner_id: Uuid,
    version_id: Uuid,
) -> Result<VersionRow, AppError> {
    let mut tx = pool.begin().await?;
    set_transaction_budgets(&mut tx).await?;

    let target_ref = find_owned_version(&mut tx, version_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

    if target_ref.owner_id != owner_id {
        return Err(AppError::Forbidden);
    }

    let ledger = LedgerRef::resume(target_ref.resume_id);
    lock_ledger(&mut tx, ledger).await?;

    // Re-read under the lock: a concurrent writer may have retargeted master
    // between the first fetch and lock acquisition.
    let target: VersionRow = sqlx::query_as(&format!(
        "SELECT {} FROM resume_versions WHERE id = $1",
        version_columns(LedgerKind::Resume)
    ))
    .bind(version_id)
    .fetch_one(&mut *tx)
    .await?;

    if target.is_master {
        return Err(AppError::BadRequest(
            "This version is already live".to_string(),
        ));
    }

    let new_version = append_master_version(&mut tx, ledger, &target.content).await?;
    tx.commit().await?;

    info!(
        "Restored version {} of resume {} as new live version {}",
        target.version_number, target_ref.resume_id, new_version.version_number
    );
    Ok(new_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_version_is_one() {
        assert_eq!(next_version_number(None), 1);
    }

    #[test]
    fn test_numbering_is_monotonic() {
        assert_eq!(next_version_number(Some(1)), 2);
        assert_eq!(next_version_number(Some(41)), 42);
    }

    #[test]
    fn test_ledger_kinds_map_to_distinct_tables() {
        assert_ne!(
            LedgerKind::Resume.versions_table(),
            LedgerKind::LockedProfile.versions_table()
        );
        assert_ne!(
            LedgerKind::Resume.parent_column(),
            LedgerKind::LockedProfile.parent_column()
        );
    }
}
