use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::EquipmentStatus;
use crate::features::status_counts::models::StatusCount;

/// Counter rows keyed by (owner_id, status_name)
#[async_trait]
pub trait StatusCountStore: Send + Sync {
    async fn get(&self, owner_id: &str, status: EquipmentStatus) -> Result<Option<StatusCount>>;

    /// Insert the row or overwrite the existing one
    async fn put(&self, count: &StatusCount) -> Result<()>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<StatusCount>>;
}

pub struct PgStatusCountStore {
    pool: PgPool,
}

impl PgStatusCountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusCountStore for PgStatusCountStore {
    async fn get(&self, owner_id: &str, status: EquipmentStatus) -> Result<Option<StatusCount>> {
        sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT owner_id, status_name, status_count, updated_at
            FROM status_counts
            WHERE owner_id = $1 AND status_name = $2
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn put(&self, count: &StatusCount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO status_counts (owner_id, status_name, status_count, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner_id, status_name) DO UPDATE SET
                status_count = EXCLUDED.status_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&count.owner_id)
        .bind(count.status_name)
        .bind(count.status_count)
        .bind(count.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write status count: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<StatusCount>> {
        sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT owner_id, status_name, status_count, updated_at
            FROM status_counts
            WHERE owner_id = $1
            ORDER BY status_name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list status counts: {:?}", e);
            AppError::Database(e)
        })
    }
}
