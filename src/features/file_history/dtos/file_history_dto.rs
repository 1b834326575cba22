use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::file_history::models::{FileEventName, FileHistoryEvent};

/// Response DTO for one attachment history event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileHistoryResponseDto {
    pub file_id: String,
    pub history_id: Uuid,
    pub event_time: DateTime<Utc>,
    pub event_name: FileEventName,
    pub file_sequencer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_etag: Option<String>,
}

impl From<FileHistoryEvent> for FileHistoryResponseDto {
    fn from(e: FileHistoryEvent) -> Self {
        Self {
            file_id: e.file_id,
            history_id: e.history_id,
            event_time: e.event_time,
            event_name: e.event_name,
            file_sequencer: e.file_sequencer,
            file_size: e.file_size,
            file_etag: e.file_etag,
        }
    }
}

/// Outcome of ingesting one storage notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummaryDto {
    pub recorded: usize,
    /// Records whose event kind is neither an upload nor a delete
    pub skipped: usize,
    /// Records that could not be parsed or stored
    pub failed: usize,
}
