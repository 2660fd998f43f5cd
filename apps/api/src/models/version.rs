use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable snapshot in a ledger. `content` and `version_number` never
/// change after insertion; only the `is_master` and `is_archived` flags do.
///
/// Queries selecting this type alias the parent foreign key (`resume_id` or
/// `locked_profile_id`) as `ledger_id` so both version tables map to one row
/// type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionRow {
    pub id: Uuid,
    pub ledger_id: Uuid,
    pub version_number: i32,
    pub content: Value,
    pub is_master: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Listing view of a version. Omits `content` so history listings stay cheap.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionSummary {
    pub id: Uuid,
    pub version_number: i32,
    pub is_master: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}
