use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::equipment::models::EquipmentStatus;
use crate::features::status_counts::dtos::StatusCountResponseDto;
use crate::features::status_counts::models::StatusCount;
use crate::features::status_counts::repository::StatusCountStore;

/// Adjusts per-owner status counters as equipment moves between statuses
#[async_trait]
pub trait StatusCountUpdater: Send + Sync {
    async fn increment(&self, owner_id: &str, status: EquipmentStatus) -> Result<()>;

    async fn decrement(&self, owner_id: &str, status: EquipmentStatus) -> Result<()>;
}

/// Read-then-write counter maintenance.
///
/// Counts never go below zero and rows are created on first touch. There is no
/// locking between the read and the write; concurrent transitions for the same
/// owner and status can lose an update.
pub struct StatusCounter {
    store: Arc<dyn StatusCountStore>,
}

impl StatusCounter {
    pub fn new(store: Arc<dyn StatusCountStore>) -> Self {
        Self { store }
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<StatusCountResponseDto>> {
        let counts = self.store.list_by_owner(owner_id).await?;
        Ok(counts.into_iter().map(Into::into).collect())
    }

    /// Current stored count, or `None` when the row is absent or could not be read
    async fn current_count(&self, owner_id: &str, status: EquipmentStatus) -> Option<i64> {
        match self.store.get(owner_id, status).await {
            Ok(row) => row.map(|r| r.status_count),
            Err(e) => {
                tracing::warn!(
                    "Failed to read status count ({}, {}), treating as absent: {}",
                    owner_id,
                    status,
                    e
                );
                None
            }
        }
    }

    async fn write_count(
        &self,
        owner_id: &str,
        status: EquipmentStatus,
        status_count: i64,
    ) -> Result<()> {
        self.store
            .put(&StatusCount {
                owner_id: owner_id.to_string(),
                status_name: status,
                status_count,
                updated_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            "Status count for owner {} set: {} = {}",
            owner_id,
            status,
            status_count
        );
        Ok(())
    }
}

#[async_trait]
impl StatusCountUpdater for StatusCounter {
    async fn increment(&self, owner_id: &str, status: EquipmentStatus) -> Result<()> {
        let next = match self.current_count(owner_id, status).await {
            Some(current) => current.max(0) + 1,
            None => 1,
        };
        self.write_count(owner_id, status, next).await
    }

    async fn decrement(&self, owner_id: &str, status: EquipmentStatus) -> Result<()> {
        let next = match self.current_count(owner_id, status).await {
            Some(current) => (current - 1).max(0),
            None => 0,
        };
        self.write_count(owner_id, status, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::status_counts::repository::memory::InMemoryStatusCountStore;
    use EquipmentStatus::{Down, Limited, Up};

    const OWNER: &str = "auth0|owner";

    fn counter() -> (StatusCounter, Arc<InMemoryStatusCountStore>) {
        let store = Arc::new(InMemoryStatusCountStore::default());
        (StatusCounter::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_increment_creates_row_at_one() {
        let (counter, store) = counter();
        counter.increment(OWNER, Up).await.unwrap();
        assert_eq!(store.count(OWNER, Up), Some(1));
    }

    #[tokio::test]
    async fn test_decrement_creates_row_at_zero() {
        let (counter, store) = counter();
        counter.decrement(OWNER, Down).await.unwrap();
        assert_eq!(store.count(OWNER, Down), Some(0));
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let (counter, store) = counter();
        store.seed(OWNER, Limited, 0);

        counter.decrement(OWNER, Limited).await.unwrap();
        counter.decrement(OWNER, Limited).await.unwrap();

        assert_eq!(store.count(OWNER, Limited), Some(0));
    }

    #[tokio::test]
    async fn test_negative_stored_count_is_floored() {
        let (counter, store) = counter();
        store.seed(OWNER, Up, -3);

        counter.increment(OWNER, Up).await.unwrap();

        assert_eq!(store.count(OWNER, Up), Some(1));
    }

    #[tokio::test]
    async fn test_count_equals_net_increments() {
        let (counter, store) = counter();

        for _ in 0..5 {
            counter.increment(OWNER, Up).await.unwrap();
        }
        for _ in 0..3 {
            counter.decrement(OWNER, Up).await.unwrap();
        }

        assert_eq!(store.count(OWNER, Up), Some(2));
        assert_eq!(store.count("someone-else", Up), None);
    }

    #[tokio::test]
    async fn test_read_failure_is_treated_as_absent() {
        let store = Arc::new(InMemoryStatusCountStore::failing_reads());
        store.seed(OWNER, Down, 7);
        let counter = StatusCounter::new(store.clone());

        counter.increment(OWNER, Down).await.unwrap();

        assert_eq!(store.count(OWNER, Down), Some(1));
    }

    #[tokio::test]
    async fn test_list_for_owner() {
        let (counter, _) = counter();
        counter.increment(OWNER, Up).await.unwrap();
        counter.increment(OWNER, Down).await.unwrap();
        counter.increment("someone-else", Limited).await.unwrap();

        let mut counts = counter.list_for_owner(OWNER).await.unwrap();
        counts.sort_by_key(|c| c.status_name.to_string());

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].status_name, Down);
        assert_eq!(counts[1].status_count, 1);
    }
}
