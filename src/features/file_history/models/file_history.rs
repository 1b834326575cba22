use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// File event name enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "file_event_name")]
pub enum FileEventName {
    Uploaded,
    Deleted,
}

impl FileEventName {
    /// Map an object store event name such as `s3:ObjectCreated:Put`.
    /// Event kinds other than creation and removal map to `None`.
    pub fn from_storage_event(event_name: &str) -> Option<Self> {
        let name = event_name.strip_prefix("s3:").unwrap_or(event_name);
        if name.starts_with("ObjectCreated:") {
            Some(FileEventName::Uploaded)
        } else if name.starts_with("ObjectRemoved:") {
            Some(FileEventName::Deleted)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FileEventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileEventName::Uploaded => write!(f, "Uploaded"),
            FileEventName::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Database model for one attachment upload or delete event
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FileHistoryEvent {
    /// Equipment id, which is also the object key
    pub file_id: String,
    pub history_id: Uuid,
    pub event_time: DateTime<Utc>,
    pub event_name: FileEventName,
    pub file_sequencer: String,
    pub file_size: Option<i64>,
    pub file_etag: Option<String>,
}

/// Data required to append a history event
#[derive(Debug, Clone)]
pub struct SaveFileHistory {
    pub file_id: String,
    pub event_time: DateTime<Utc>,
    pub event_name: FileEventName,
    pub file_sequencer: String,
    pub file_size: Option<i64>,
    pub file_etag: Option<String>,
}
