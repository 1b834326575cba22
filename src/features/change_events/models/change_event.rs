use serde_json::Value;
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::equipment::models::EquipmentStatus;

/// Kind of row change, matching the change log's event name enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type)]
#[sqlx(type_name = "change_event_name")]
pub enum ChangeKind {
    #[sqlx(rename = "INSERT")]
    Inserted,
    #[sqlx(rename = "MODIFY")]
    Modified,
    #[sqlx(rename = "REMOVE")]
    Removed,
}

/// One equipment row change with its before and after images
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ChangeEvent {
    /// Position in the change log
    pub sequence: i64,
    pub kind: ChangeKind,
    pub owner_id: String,
    pub equipment_id: Uuid,
    pub old_image: Option<Value>,
    pub new_image: Option<Value>,
}

/// Which image of a change event a status was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    Old,
    New,
}

impl std::fmt::Display for ImageSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSide::Old => write!(f, "old"),
            ImageSide::New => write!(f, "new"),
        }
    }
}

impl ChangeEvent {
    /// Equipment status carried by one of the images
    pub fn status(&self, side: ImageSide) -> Result<EquipmentStatus, ChangeEventError> {
        let image = match side {
            ImageSide::Old => self.old_image.as_ref(),
            ImageSide::New => self.new_image.as_ref(),
        }
        .ok_or(ChangeEventError::MissingImage {
            sequence: self.sequence,
            side,
        })?;

        let status = image
            .get("status")
            .ok_or(ChangeEventError::MissingStatus {
                sequence: self.sequence,
                side,
            })?;

        serde_json::from_value(status.clone()).map_err(|_| ChangeEventError::UnknownStatus {
            sequence: self.sequence,
            value: status.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChangeEventError {
    #[error("Change {sequence} has no {side} image")]
    MissingImage { sequence: i64, side: ImageSide },

    #[error("Change {sequence} {side} image has no status")]
    MissingStatus { sequence: i64, side: ImageSide },

    #[error("Change {sequence} carries unknown status {value}")]
    UnknownStatus { sequence: i64, value: String },

    #[error("Failed to update status count: {0}")]
    Counter(#[from] AppError),
}

/// Outcome of dispatching one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}
