use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::file_history::dtos::{FileHistoryResponseDto, NotificationSummaryDto};
use crate::features::file_history::models::{
    FileEventName, FileHistoryEvent, SaveFileHistory, StorageEventNotification,
    StorageEventRecord,
};
use crate::features::file_history::repository::FileHistoryStore;

/// Records attachment upload and delete events reported by the object store
pub struct HistoryRecorder {
    store: Arc<dyn FileHistoryStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn FileHistoryStore>) -> Self {
        Self { store }
    }

    /// Store the event under a freshly generated history id
    pub async fn append(&self, request: SaveFileHistory) -> Result<FileHistoryEvent> {
        let event = FileHistoryEvent {
            file_id: request.file_id,
            history_id: Uuid::new_v4(),
            event_time: request.event_time,
            event_name: request.event_name,
            file_sequencer: request.file_sequencer,
            file_size: request.file_size,
            file_etag: request.file_etag,
        };

        self.store.append(&event).await?;
        tracing::info!(
            "File history {} recorded: {} {}",
            event.history_id,
            event.file_id,
            event.event_name
        );

        Ok(event)
    }

    pub async fn list(&self, file_id: &str) -> Result<Vec<FileHistoryResponseDto>> {
        let events = self.store.list_by_file(file_id).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    /// Append one history event per upload or delete record.
    ///
    /// A record that cannot be parsed or appended is logged, counted as failed
    /// and does not stop the others.
    pub async fn record_storage_notification(
        &self,
        notification: StorageEventNotification,
    ) -> NotificationSummaryDto {
        let mut summary = NotificationSummaryDto::default();

        for raw in notification.records {
            let record: StorageEventRecord = match serde_json::from_value(raw) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping malformed storage event record: {}", e);
                    summary.failed += 1;
                    continue;
                }
            };

            let Some(request) = save_request_from_record(&record) else {
                tracing::debug!("Ignoring storage event {}", record.event_name);
                summary.skipped += 1;
                continue;
            };

            match self.append(request).await {
                Ok(_) => summary.recorded += 1,
                Err(e) => {
                    tracing::error!(
                        "Failed to record storage event {} for {}: {}",
                        record.event_name,
                        record.s3.object.key,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

fn save_request_from_record(record: &StorageEventRecord) -> Option<SaveFileHistory> {
    let event_name = FileEventName::from_storage_event(&record.event_name)?;
    let object = &record.s3.object;

    Some(SaveFileHistory {
        file_id: decode_object_key(&object.key),
        event_time: record.event_time,
        event_name,
        file_sequencer: object.sequencer.clone().unwrap_or_default(),
        file_size: object.size,
        file_etag: object.e_tag.clone(),
    })
}

/// Object keys arrive form-encoded: `+` for spaces, `%XX` for the rest
fn decode_object_key(key: &str) -> String {
    let spaced = key.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
