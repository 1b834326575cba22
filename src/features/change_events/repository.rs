use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::features::change_events::models::ChangeEvent;

/// Ordered source of equipment row changes shared by any number of drainers
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Take the oldest unclaimed changes, at most `limit` of them.
    ///
    /// A claimed change is not handed to another caller until its claim
    /// times out, which is how an unacknowledged batch gets redelivered.
    async fn claim_batch(&self, limit: i64) -> Result<Vec<ChangeEvent>>;

    /// Drop changes that have been dispatched
    async fn acknowledge(&self, sequences: &[i64]) -> Result<()>;
}

/// Change log filled by the `equipment` table trigger
pub struct PgChangeFeed {
    pool: PgPool,
    claim_timeout: Duration,
}

impl PgChangeFeed {
    pub fn new(pool: PgPool, claim_timeout: Duration) -> Self {
        Self {
            pool,
            claim_timeout,
        }
    }
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    async fn claim_batch(&self, limit: i64) -> Result<Vec<ChangeEvent>> {
        // SKIP LOCKED keeps concurrent drainers from claiming the same rows
        let mut events = sqlx::query_as::<_, ChangeEvent>(
            r#"
            UPDATE equipment_changes
            SET claimed_at = NOW()
            WHERE id IN (
                SELECT id
                FROM equipment_changes
                WHERE claimed_at IS NULL
                   OR claimed_at < NOW() - make_interval(secs => $2)
                ORDER BY id
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id AS sequence, event_name AS kind, owner_id, equipment_id, old_image, new_image
            "#,
        )
        .bind(limit)
        .bind(self.claim_timeout.as_secs_f64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to claim equipment changes: {:?}", e);
            AppError::Database(e)
        })?;

        // RETURNING gives no ordering guarantee
        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    async fn acknowledge(&self, sequences: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM equipment_changes WHERE id = ANY($1)")
            .bind(sequences)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to acknowledge equipment changes: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    struct PendingChange {
        event: ChangeEvent,
        claimed_at: Option<Instant>,
    }

    pub struct InMemoryChangeFeed {
        pending: Mutex<Vec<PendingChange>>,
        claim_timeout: Duration,
    }

    impl Default for InMemoryChangeFeed {
        fn default() -> Self {
            Self::with_claim_timeout(Duration::from_secs(60))
        }
    }

    impl InMemoryChangeFeed {
        pub fn with_claim_timeout(claim_timeout: Duration) -> Self {
            Self {
                pending: Mutex::new(Vec::new()),
                claim_timeout,
            }
        }

        pub fn push(&self, event: ChangeEvent) {
            self.pending.lock().unwrap().push(PendingChange {
                event,
                claimed_at: None,
            });
        }

        /// Changes not yet acknowledged, claimed or not
        pub fn pending(&self) -> usize {
            self.pending.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChangeFeed for InMemoryChangeFeed {
        async fn claim_batch(&self, limit: i64) -> Result<Vec<ChangeEvent>> {
            let mut pending = self.pending.lock().unwrap();
            pending.sort_by_key(|p| p.event.sequence);

            let now = Instant::now();
            let mut claimed = Vec::new();
            for change in pending.iter_mut() {
                if claimed.len() as i64 >= limit {
                    break;
                }
                let free = match change.claimed_at {
                    None => true,
                    Some(at) => now.duration_since(at) >= self.claim_timeout,
                };
                if free {
                    change.claimed_at = Some(now);
                    claimed.push(change.event.clone());
                }
            }

            Ok(claimed)
        }

        async fn acknowledge(&self, sequences: &[i64]) -> Result<()> {
            self.pending
                .lock()
                .unwrap()
                .retain(|p| !sequences.contains(&p.event.sequence));
            Ok(())
        }
    }
}
