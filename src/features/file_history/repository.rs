use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::file_history::models::FileHistoryEvent;

/// Append-only history rows, looked up by file id
#[async_trait]
pub trait FileHistoryStore: Send + Sync {
    async fn append(&self, event: &FileHistoryEvent) -> Result<()>;

    async fn list_by_file(&self, file_id: &str) -> Result<Vec<FileHistoryEvent>>;
}

pub struct PgFileHistoryStore {
    pool: PgPool,
}

impl PgFileHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileHistoryStore for PgFileHistoryStore {
    async fn append(&self, event: &FileHistoryEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO file_history (history_id, file_id, event_time, event_name, file_sequencer, file_size, file_etag)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.history_id)
        .bind(&event.file_id)
        .bind(event.event_time)
        .bind(event.event_name)
        .bind(&event.file_sequencer)
        .bind(event.file_size)
        .bind(&event.file_etag)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append file history: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn list_by_file(&self, file_id: &str) -> Result<Vec<FileHistoryEvent>> {
        sqlx::query_as::<_, FileHistoryEvent>(
            r#"
            SELECT file_id, history_id, event_time, event_name, file_sequencer, file_size, file_etag
            FROM file_history
            WHERE file_id = $1
            ORDER BY event_time
            "#,
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list file history: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryFileHistoryStore {
        rows: Mutex<Vec<FileHistoryEvent>>,
    }

    #[async_trait]
    impl FileHistoryStore for InMemoryFileHistoryStore {
        async fn append(&self, event: &FileHistoryEvent) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|row| row.history_id == event.history_id) {
                return Err(AppError::Internal(format!(
                    "history {} already exists",
                    event.history_id
                )));
            }
            rows.push(event.clone());
            Ok(())
        }

        async fn list_by_file(&self, file_id: &str) -> Result<Vec<FileHistoryEvent>> {
            let mut events: Vec<FileHistoryEvent> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.file_id == file_id)
                .cloned()
                .collect();
            events.sort_by_key(|e| e.event_time);
            Ok(events)
        }
    }
}
