use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named, independently versioned fork of an owner's master resume.
/// `name` is unique per owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LockedProfileRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
