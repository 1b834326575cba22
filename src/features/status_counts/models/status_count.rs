use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::equipment::models::EquipmentStatus;

/// Number of an owner's equipment items currently in one status
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StatusCount {
    pub owner_id: String,
    pub status_name: EquipmentStatus,
    pub status_count: i64,
    pub updated_at: DateTime<Utc>,
}
