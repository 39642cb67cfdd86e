//! Alert preference entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the alert_preferences table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertPreferenceEntity {
    pub owner_id: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
