use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::equipment::models::{Equipment, EquipmentStatus};

/// Request DTO for creating equipment
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub status: EquipmentStatus,
}

/// Request DTO for updating equipment
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipmentDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub status: EquipmentStatus,
    /// Defaults to the time of the update when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<DateTime<Utc>>,
}

/// Response DTO for equipment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentResponseDto {
    pub equipment_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: EquipmentStatus,
    pub status_changed_at: DateTime<Utc>,
    pub attachment_url: String,
}

impl From<Equipment> for EquipmentResponseDto {
    fn from(e: Equipment) -> Self {
        Self {
            equipment_id: e.equipment_id,
            name: e.name,
            created_at: e.created_at,
            status: e.status,
            status_changed_at: e.status_changed_at,
            attachment_url: e.attachment_url,
        }
    }
}

/// Response DTO for a presigned attachment upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponseDto {
    pub upload_url: String,
}
