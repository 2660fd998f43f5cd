use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One public view of a resolved resume. Append-only; duplicates (refreshes)
/// are expected and counted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalyticsEventRow {
    pub id: Uuid,
    pub username: String,
    pub resume_kind: String,
    pub profile_name: Option<String>,
    pub version_number: Option<i32>,
    pub country: String,
    pub city: String,
    pub device: String,
    pub browser: String,
    pub referrer: String,
    pub user_agent: Option<String>,
    pub viewed_at: DateTime<Utc>,
}
