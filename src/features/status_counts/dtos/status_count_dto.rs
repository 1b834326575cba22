use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::equipment::models::EquipmentStatus;
use crate::features::status_counts::models::StatusCount;

/// Response DTO for one status counter of the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountResponseDto {
    pub status_name: EquipmentStatus,
    pub status_count: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<StatusCount> for StatusCountResponseDto {
    fn from(c: StatusCount) -> Self {
        Self {
            status_name: c.status_name,
            status_count: c.status_count,
            updated_at: c.updated_at,
        }
    }
}
