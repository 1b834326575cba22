use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Equipment status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "equipment_status")]
pub enum EquipmentStatus {
    Up,
    Down,
    Limited,
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentStatus::Up => write!(f, "Up"),
            EquipmentStatus::Down => write!(f, "Down"),
            EquipmentStatus::Limited => write!(f, "Limited"),
        }
    }
}

/// Database model for equipment, keyed by (owner_id, equipment_id)
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Equipment {
    pub owner_id: String,
    pub equipment_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: EquipmentStatus,
    pub status_changed_at: DateTime<Utc>,
    /// Empty until an upload URL has been requested
    pub attachment_url: String,
}

/// Fields replaced by an equipment update
#[derive(Debug, Clone)]
pub struct EquipmentUpdate {
    pub name: String,
    pub status: EquipmentStatus,
    pub status_changed_at: DateTime<Utc>,
}
