use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::core::config::ChangeStreamConfig;
use crate::core::error::Result;
use crate::features::change_events::models::BatchSummary;
use crate::features::change_events::repository::ChangeFeed;
use crate::features::change_events::services::ChangeEventDispatcher;

/// Background worker draining the equipment change log.
///
/// Several workers may drain the same log; each batch is claimed before it is
/// dispatched. Changes are acknowledged only after dispatch, so a crash in
/// between redelivers the batch once its claim times out.
pub struct ChangeStreamWorker {
    feed: Arc<dyn ChangeFeed>,
    dispatcher: ChangeEventDispatcher,
    poll_interval: Duration,
    batch_size: i64,
}

impl ChangeStreamWorker {
    pub fn new(
        feed: Arc<dyn ChangeFeed>,
        dispatcher: ChangeEventDispatcher,
        config: &ChangeStreamConfig,
    ) -> Self {
        Self {
            feed,
            dispatcher,
            poll_interval: config.poll_interval,
            batch_size: config.batch_size,
        }
    }

    /// Run the worker in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting change stream worker (poll interval: {:?}, batch size: {})",
            self.poll_interval,
            self.batch_size
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            // Keep draining while batches come back full
            loop {
                match self.drain_once().await {
                    Ok(Some(fetched)) if fetched as i64 >= self.batch_size => continue,
                    Ok(_) => break,
                    Err(e) => {
                        tracing::error!("Error processing change batch: {:?}", e);
                        break;
                    }
                }
            }
        }
    }

    /// Claim, dispatch and acknowledge one batch; returns how many changes were claimed
    pub async fn drain_once(&self) -> Result<Option<usize>> {
        let events = self.feed.claim_batch(self.batch_size).await?;
        if events.is_empty() {
            return Ok(None);
        }

        let summary: BatchSummary = self.dispatcher.process_batch(&events).await;
        let sequences: Vec<i64> = events.iter().map(|e| e.sequence).collect();
        self.feed.acknowledge(&sequences).await?;

        tracing::info!(
            "Change batch done: {} processed, {} failed",
            summary.processed,
            summary.failed
        );

        Ok(Some(events.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::change_events::models::{ChangeEvent, ChangeKind};
    use crate::features::change_events::repository::memory::InMemoryChangeFeed;
    use crate::features::equipment::models::EquipmentStatus;
    use crate::features::status_counts::repository::memory::InMemoryStatusCountStore;
    use crate::features::status_counts::{StatusCountUpdater, StatusCounter};
    use async_trait::async_trait;
    use serde_json::json;
    use uuid::Uuid;

    const OWNER: &str = "auth0|owner";

    fn insert(sequence: i64, status: Option<&str>) -> ChangeEvent {
        ChangeEvent {
            sequence,
            kind: ChangeKind::Inserted,
            owner_id: OWNER.to_string(),
            equipment_id: Uuid::new_v4(),
            old_image: None,
            new_image: status.map(|s| json!({ "status": s })),
        }
    }

    /// Counter that gives other tasks a chance to run before every write
    struct YieldingCounter(StatusCounter);

    #[async_trait]
    impl StatusCountUpdater for YieldingCounter {
        async fn increment(&self, owner_id: &str, status: EquipmentStatus) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.increment(owner_id, status).await
        }

        async fn decrement(&self, owner_id: &str, status: EquipmentStatus) -> Result<()> {
            tokio::task::yield_now().await;
            self.0.decrement(owner_id, status).await
        }
    }

    fn config(batch_size: i64) -> ChangeStreamConfig {
        ChangeStreamConfig {
            poll_interval: Duration::from_millis(10),
            batch_size,
            claim_timeout: Duration::from_secs(60),
        }
    }

    fn worker(
        feed: Arc<InMemoryChangeFeed>,
        store: Arc<InMemoryStatusCountStore>,
        batch_size: i64,
    ) -> ChangeStreamWorker {
        let dispatcher = ChangeEventDispatcher::new(Arc::new(StatusCounter::new(store)));
        ChangeStreamWorker::new(feed, dispatcher, &config(batch_size))
    }

    #[tokio::test]
    async fn test_drain_acknowledges_processed_and_failed_changes() {
        let feed = Arc::new(InMemoryChangeFeed::default());
        let store = Arc::new(InMemoryStatusCountStore::default());
        feed.push(insert(1, Some("Up")));
        feed.push(insert(2, None));
        feed.push(insert(3, Some("Up")));

        let worker = worker(feed.clone(), store.clone(), 10);

        assert_eq!(worker.drain_once().await.unwrap(), Some(3));
        assert_eq!(feed.pending(), 0);
        assert_eq!(store.count(OWNER, EquipmentStatus::Up), Some(2));
        assert_eq!(worker.drain_once().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_drain_respects_batch_size() {
        let feed = Arc::new(InMemoryChangeFeed::default());
        let store = Arc::new(InMemoryStatusCountStore::default());
        for sequence in 1..=5 {
            feed.push(insert(sequence, Some("Down")));
        }

        let worker = worker(feed.clone(), store.clone(), 2);

        assert_eq!(worker.drain_once().await.unwrap(), Some(2));
        assert_eq!(feed.pending(), 3);
        assert_eq!(store.count(OWNER, EquipmentStatus::Down), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_workers_count_each_change_once() {
        let feed = Arc::new(InMemoryChangeFeed::default());
        let store = Arc::new(InMemoryStatusCountStore::default());
        feed.push(insert(1, Some("Up")));

        let yielding_worker = || {
            let counter = YieldingCounter(StatusCounter::new(store.clone()));
            ChangeStreamWorker::new(
                feed.clone(),
                ChangeEventDispatcher::new(Arc::new(counter)),
                &config(10),
            )
        };
        let first = yielding_worker();
        let second = yielding_worker();

        let (a, b) = tokio::join!(first.drain_once(), second.drain_once());

        let mut claimed = vec![a.unwrap(), b.unwrap()];
        claimed.sort();
        assert_eq!(claimed, vec![None, Some(1)]);
        assert_eq!(store.count(OWNER, EquipmentStatus::Up), Some(1));
        assert_eq!(feed.pending(), 0);
    }

    #[tokio::test]
    async fn test_unacknowledged_claim_is_redelivered_after_timeout() {
        let feed = Arc::new(InMemoryChangeFeed::with_claim_timeout(Duration::ZERO));
        feed.push(insert(1, Some("Limited")));

        // A drainer that died after claiming never acknowledges
        let abandoned = feed.claim_batch(10).await.unwrap();
        assert_eq!(abandoned.len(), 1);

        let store = Arc::new(InMemoryStatusCountStore::default());
        let worker = worker(feed.clone(), store.clone(), 10);

        assert_eq!(worker.drain_once().await.unwrap(), Some(1));
        assert_eq!(store.count(OWNER, EquipmentStatus::Limited), Some(1));
        assert_eq!(feed.pending(), 0);
    }

    #[tokio::test]
    async fn test_claimed_changes_are_hidden_until_timeout() {
        let feed = InMemoryChangeFeed::default();
        feed.push(insert(1, Some("Up")));
        feed.push(insert(2, Some("Down")));

        let first = feed.claim_batch(1).await.unwrap();
        let second = feed.claim_batch(10).await.unwrap();

        assert_eq!(first.iter().map(|e| e.sequence).collect::<Vec<_>>(), vec![1]);
        assert_eq!(second.iter().map(|e| e.sequence).collect::<Vec<_>>(), vec![2]);
        assert!(feed.claim_batch(10).await.unwrap().is_empty());
    }
}
