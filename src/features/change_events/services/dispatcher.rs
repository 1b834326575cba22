use std::sync::Arc;

use crate::features::change_events::models::{
    BatchSummary, ChangeEvent, ChangeEventError, ChangeKind, ImageSide,
};
use crate::features::status_counts::StatusCountUpdater;

/// Routes equipment changes to the status counters.
///
/// Delivery is at-least-once with no deduplication, so a redelivered batch
/// counts twice.
pub struct ChangeEventDispatcher {
    counter: Arc<dyn StatusCountUpdater>,
}

impl ChangeEventDispatcher {
    pub fn new(counter: Arc<dyn StatusCountUpdater>) -> Self {
        Self { counter }
    }

    /// Dispatch every event; a failing event is logged and the rest still run
    pub async fn process_batch(&self, events: &[ChangeEvent]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for event in events {
            match self.dispatch(event).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    tracing::error!(
                        "Failed to process {:?} change {} for equipment {}: {}",
                        event.kind,
                        event.sequence,
                        event.equipment_id,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub async fn dispatch(&self, event: &ChangeEvent) -> Result<(), ChangeEventError> {
        match event.kind {
            ChangeKind::Inserted => self.process_insert(event).await,
            ChangeKind::Modified => self.process_update(event).await,
            ChangeKind::Removed => self.process_delete(event).await,
        }
    }

    pub async fn process_insert(&self, event: &ChangeEvent) -> Result<(), ChangeEventError> {
        let status = event.status(ImageSide::New)?;
        self.counter.increment(&event.owner_id, status).await?;
        Ok(())
    }

    /// Move one count from the old status to the new one; nothing happens when
    /// the status did not change
    pub async fn process_update(&self, event: &ChangeEvent) -> Result<(), ChangeEventError> {
        let old_status = event.status(ImageSide::Old)?;
        let new_status = event.status(ImageSide::New)?;

        if old_status == new_status {
            return Ok(());
        }

        tracing::info!(
            "Equipment {} status changed: {} -> {}",
            event.equipment_id,
            old_status,
            new_status
        );
        self.counter.increment(&event.owner_id, new_status).await?;
        self.counter.decrement(&event.owner_id, old_status).await?;
        Ok(())
    }

    pub async fn process_delete(&self, event: &ChangeEvent) -> Result<(), ChangeEventError> {
        let status = event.status(ImageSide::Old)?;
        self.counter.decrement(&event.owner_id, status).await?;
        Ok(())
    }
}
