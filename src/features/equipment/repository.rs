use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{Equipment, EquipmentUpdate};

/// Key-based access to equipment rows, always scoped to one owner
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// All equipment of the owner, oldest first
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Equipment>>;

    async fn find(&self, owner_id: &str, equipment_id: Uuid) -> Result<Option<Equipment>>;

    /// Insert the row or fully replace the one with the same key
    async fn put(&self, equipment: &Equipment) -> Result<()>;

    /// Replace name and status fields, leaving creation time and attachment untouched
    async fn update(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
        update: &EquipmentUpdate,
    ) -> Result<Option<Equipment>>;

    /// Returns whether a row was removed
    async fn delete(&self, owner_id: &str, equipment_id: Uuid) -> Result<bool>;

    /// Returns whether a row was updated
    async fn set_attachment_url(&self, owner_id: &str, equipment_id: Uuid, url: &str)
        -> Result<bool>;
}

const EQUIPMENT_COLUMNS: &str =
    "owner_id, equipment_id, name, created_at, status, status_changed_at, attachment_url";

pub struct PgEquipmentStore {
    pool: PgPool,
}

impl PgEquipmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentStore for PgEquipmentStore {
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Equipment>> {
        let query = format!(
            "SELECT {} FROM equipment WHERE owner_id = $1 ORDER BY created_at",
            EQUIPMENT_COLUMNS
        );

        sqlx::query_as::<_, Equipment>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list equipment: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find(&self, owner_id: &str, equipment_id: Uuid) -> Result<Option<Equipment>> {
        let query = format!(
            "SELECT {} FROM equipment WHERE owner_id = $1 AND equipment_id = $2",
            EQUIPMENT_COLUMNS
        );

        sqlx::query_as::<_, Equipment>(&query)
            .bind(owner_id)
            .bind(equipment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find equipment: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn put(&self, equipment: &Equipment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment (owner_id, equipment_id, name, created_at, status, status_changed_at, attachment_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (owner_id, equipment_id) DO UPDATE SET
                name = EXCLUDED.name,
                created_at = EXCLUDED.created_at,
                status = EXCLUDED.status,
                status_changed_at = EXCLUDED.status_changed_at,
                attachment_url = EXCLUDED.attachment_url
            "#,
        )
        .bind(&equipment.owner_id)
        .bind(equipment.equipment_id)
        .bind(&equipment.name)
        .bind(equipment.created_at)
        .bind(equipment.status)
        .bind(equipment.status_changed_at)
        .bind(&equipment.attachment_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to put equipment: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn update(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
        update: &EquipmentUpdate,
    ) -> Result<Option<Equipment>> {
        let query = format!(
            r#"
            UPDATE equipment
            SET name = $3, status = $4, status_changed_at = $5
            WHERE owner_id = $1 AND equipment_id = $2
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        );

        sqlx::query_as::<_, Equipment>(&query)
            .bind(owner_id)
            .bind(equipment_id)
            .bind(&update.name)
            .bind(update.status)
            .bind(update.status_changed_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update equipment: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete(&self, owner_id: &str, equipment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE owner_id = $1 AND equipment_id = $2")
            .bind(owner_id)
            .bind(equipment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete equipment: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_attachment_url(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
        url: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE equipment SET attachment_url = $3 WHERE owner_id = $1 AND equipment_id = $2",
        )
        .bind(owner_id)
        .bind(equipment_id)
        .bind(url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set attachment URL: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// HashMap-backed store for service and handler tests
    #[derive(Default)]
    pub struct InMemoryEquipmentStore {
        rows: Mutex<HashMap<(String, Uuid), Equipment>>,
    }

    #[async_trait]
    impl EquipmentStore for InMemoryEquipmentStore {
        async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Equipment>> {
            let rows = self.rows.lock().unwrap();
            let mut items: Vec<Equipment> = rows
                .values()
                .filter(|e| e.owner_id == owner_id)
                .cloned()
                .collect();
            items.sort_by_key(|e| e.created_at);
            Ok(items)
        }

        async fn find(&self, owner_id: &str, equipment_id: Uuid) -> Result<Option<Equipment>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&(owner_id.to_string(), equipment_id)).cloned())
        }

        async fn put(&self, equipment: &Equipment) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            rows.insert(
                (equipment.owner_id.clone(), equipment.equipment_id),
                equipment.clone(),
            );
            Ok(())
        }

        async fn update(
            &self,
            owner_id: &str,
            equipment_id: Uuid,
            update: &EquipmentUpdate,
        ) -> Result<Option<Equipment>> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .get_mut(&(owner_id.to_string(), equipment_id))
                .map(|row| {
                    row.name = update.name.clone();
                    row.status = update.status;
                    row.status_changed_at = update.status_changed_at;
                    row.clone()
                }))
        }

        async fn delete(&self, owner_id: &str, equipment_id: Uuid) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.remove(&(owner_id.to_string(), equipment_id)).is_some())
        }

        async fn set_attachment_url(
            &self,
            owner_id: &str,
            equipment_id: Uuid,
            url: &str,
        ) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .get_mut(&(owner_id.to_string(), equipment_id))
                .map(|row| row.attachment_url = url.to_string())
                .is_some())
        }
    }
}
