use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::dtos::{
    CreateEquipmentDto, EquipmentResponseDto, UpdateEquipmentDto, UploadUrlResponseDto,
};
use crate::features::equipment::models::{Equipment, EquipmentUpdate};
use crate::features::equipment::repository::EquipmentStore;
use crate::modules::metrics::LatencyRecorder;
use crate::modules::storage::AttachmentStorage;
use crate::shared::constants::GENERATE_UPLOAD_URL_METRIC;

/// Service for equipment operations, scoped to the calling owner
pub struct EquipmentService {
    store: Arc<dyn EquipmentStore>,
    storage: Arc<dyn AttachmentStorage>,
    latency: Arc<dyn LatencyRecorder>,
}

impl EquipmentService {
    pub fn new(
        store: Arc<dyn EquipmentStore>,
        storage: Arc<dyn AttachmentStorage>,
        latency: Arc<dyn LatencyRecorder>,
    ) -> Self {
        Self {
            store,
            storage,
            latency,
        }
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<EquipmentResponseDto>> {
        let items = self.store.list_by_owner(owner_id).await?;
        tracing::debug!("Found {} equipment items for owner {}", items.len(), owner_id);
        Ok(items.into_iter().map(Into::into).collect())
    }

    /// Look up one item of the owner; `None` when it is unknown or belongs to someone else
    pub async fn find(&self, owner_id: &str, equipment_id: Uuid) -> Result<Option<Equipment>> {
        self.store.find(owner_id, equipment_id).await
    }

    pub async fn create(
        &self,
        owner_id: &str,
        dto: CreateEquipmentDto,
    ) -> Result<EquipmentResponseDto> {
        let now = Utc::now();
        let equipment = Equipment {
            owner_id: owner_id.to_string(),
            equipment_id: Uuid::new_v4(),
            name: dto.name,
            created_at: now,
            status: dto.status,
            status_changed_at: now,
            attachment_url: String::new(),
        };

        self.store.put(&equipment).await?;
        tracing::info!(
            "Equipment {} created for owner {}",
            equipment.equipment_id,
            owner_id
        );

        Ok(equipment.into())
    }

    pub async fn update(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
        dto: UpdateEquipmentDto,
    ) -> Result<EquipmentResponseDto> {
        self.require_owned(
            owner_id,
            equipment_id,
            "Equipment not updated. Equipment is not owned by user.",
        )
        .await?;

        let update = EquipmentUpdate {
            name: dto.name,
            status: dto.status,
            status_changed_at: dto.status_changed_at.unwrap_or_else(Utc::now),
        };

        let updated = self
            .store
            .update(owner_id, equipment_id, &update)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Equipment not updated. Equipment no longer exists.".to_string())
            })?;

        tracing::info!(
            "Equipment {} updated for owner {} (status: {})",
            equipment_id,
            owner_id,
            updated.status
        );

        Ok(updated.into())
    }

    /// Delete the row, then make a best-effort attempt at removing its attachment
    pub async fn delete(&self, owner_id: &str, equipment_id: Uuid) -> Result<()> {
        self.require_owned(
            owner_id,
            equipment_id,
            "Equipment not deleted. Equipment is not owned by user.",
        )
        .await?;

        self.store.delete(owner_id, equipment_id).await?;
        tracing::info!("Equipment {} deleted for owner {}", equipment_id, owner_id);

        self.delete_attachment(equipment_id).await;
        Ok(())
    }

    /// Point the item's attachment URL at its object and hand out a presigned PUT URL.
    ///
    /// The latency sample is recorded whether or not the call succeeds.
    pub async fn create_attachment_upload_url(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
    ) -> Result<UploadUrlResponseDto> {
        let started = Instant::now();
        let result = self.generate_upload_url(owner_id, equipment_id).await;
        self.latency
            .record_latency(GENERATE_UPLOAD_URL_METRIC, started.elapsed());
        result
    }

    async fn generate_upload_url(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
    ) -> Result<UploadUrlResponseDto> {
        self.require_owned(
            owner_id,
            equipment_id,
            "No presigned URL created. Equipment is not owned by user.",
        )
        .await?;

        let key = equipment_id.to_string();
        let attachment_url = versioned_attachment_url(&self.storage.object_url(&key), Utc::now());

        self.store
            .set_attachment_url(owner_id, equipment_id, &attachment_url)
            .await?;

        let upload_url = self.storage.presigned_upload_url(&key).await?;
        tracing::info!(
            "Presigned upload URL generated for equipment {} (attachment: {})",
            equipment_id,
            attachment_url
        );

        Ok(UploadUrlResponseDto { upload_url })
    }

    async fn require_owned(
        &self,
        owner_id: &str,
        equipment_id: Uuid,
        message: &str,
    ) -> Result<Equipment> {
        self.store
            .find(owner_id, equipment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(message.to_string()))
    }

    async fn delete_attachment(&self, equipment_id: Uuid) {
        let key = equipment_id.to_string();

        // Deleting a key that was never uploaded succeeds on S3-compatible stores
        if let Err(e) = self.storage.delete(&key).await {
            tracing::warn!("Failed to delete attachment {}: {}", key, e);
        }
    }
}

/// Attachment URL with a cache-busting timestamp so clients refetch replaced images
pub fn versioned_attachment_url(object_url: &str, now: DateTime<Utc>) -> String {
    format!("{}?t={}", object_url, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::equipment::models::EquipmentStatus;
    use crate::features::equipment::repository::memory::InMemoryEquipmentStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::time::Duration;

    const OWNER: &str = "auth0|owner";

    #[derive(Default)]
    struct RecordingStorage {
        deleted: Mutex<Vec<String>>,
        fail_delete: bool,
    }

    #[async_trait]
    impl AttachmentStorage for RecordingStorage {
        fn object_url(&self, key: &str) -> String {
            format!("http://localhost:9000/attachments/{}", key)
        }

        async fn presigned_upload_url(&self, key: &str) -> Result<String> {
            Ok(format!("http://localhost:9000/attachments/{}?X-Amz-Signature=abc", key))
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            if self.fail_delete {
                return Err(AppError::Storage("connection reset".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLatency {
        samples: Mutex<Vec<String>>,
    }

    impl LatencyRecorder for RecordingLatency {
        fn record_latency(&self, name: &str, _elapsed: Duration) {
            self.samples.lock().unwrap().push(name.to_string());
        }
    }

    struct Fixture {
        service: EquipmentService,
        storage: Arc<RecordingStorage>,
        latency: Arc<RecordingLatency>,
    }

    fn fixture(storage: RecordingStorage) -> Fixture {
        let storage = Arc::new(storage);
        let latency = Arc::new(RecordingLatency::default());
        let service = EquipmentService::new(
            Arc::new(InMemoryEquipmentStore::default()),
            storage.clone(),
            latency.clone(),
        );
        Fixture {
            service,
            storage,
            latency,
        }
    }

    fn pump(status: EquipmentStatus) -> CreateEquipmentDto {
        CreateEquipmentDto {
            name: "Pump A".to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let f = fixture(RecordingStorage::default());
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();

        let items = f.service.list_for_owner(OWNER).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].equipment_id, created.equipment_id);
        assert_eq!(items[0].name, "Pump A");
        assert_eq!(items[0].status, EquipmentStatus::Up);
        assert_eq!(items[0].created_at, items[0].status_changed_at);
        assert_eq!(items[0].attachment_url, "");

        assert!(f.service.list_for_owner("someone-else").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_defaults_status_changed_at_to_now() {
        let f = fixture(RecordingStorage::default());
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();
        let before = Utc::now();

        let updated = f
            .service
            .update(
                OWNER,
                created.equipment_id,
                UpdateEquipmentDto {
                    name: "Pump B".to_string(),
                    status: EquipmentStatus::Down,
                    status_changed_at: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Pump B");
        assert_eq!(updated.status, EquipmentStatus::Down);
        assert!(updated.status_changed_at >= before);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_keeps_client_status_changed_at() {
        let f = fixture(RecordingStorage::default());
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();
        let changed_at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let updated = f
            .service
            .update(
                OWNER,
                created.equipment_id,
                UpdateEquipmentDto {
                    name: "Pump A".to_string(),
                    status: EquipmentStatus::Limited,
                    status_changed_at: Some(changed_at),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status_changed_at, changed_at);
    }

    #[tokio::test]
    async fn test_update_of_foreign_equipment_is_not_found() {
        let f = fixture(RecordingStorage::default());
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();

        let result = f
            .service
            .update(
                "intruder",
                created.equipment_id,
                UpdateEquipmentDto {
                    name: "Mine now".to_string(),
                    status: EquipmentStatus::Down,
                    status_changed_at: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let items = f.service.list_for_owner(OWNER).await.unwrap();
        assert_eq!(items[0].name, "Pump A");
    }

    #[tokio::test]
    async fn test_delete_attempts_attachment_delete_without_upload() {
        let f = fixture(RecordingStorage {
            fail_delete: true,
            ..Default::default()
        });
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();

        f.service.delete(OWNER, created.equipment_id).await.unwrap();

        assert!(f.service.list_for_owner(OWNER).await.unwrap().is_empty());
        assert_eq!(
            *f.storage.deleted.lock().unwrap(),
            vec![created.equipment_id.to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_of_foreign_equipment_leaves_storage_alone() {
        let f = fixture(RecordingStorage::default());
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();

        let result = f.service.delete("intruder", created.equipment_id).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(f.storage.deleted.lock().unwrap().is_empty());
        assert_eq!(f.service.list_for_owner(OWNER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_url_sets_versioned_attachment_url() {
        let f = fixture(RecordingStorage::default());
        let created = f.service.create(OWNER, pump(EquipmentStatus::Up)).await.unwrap();
        let id = created.equipment_id.to_string();

        let response = f
            .service
            .create_attachment_upload_url(OWNER, created.equipment_id)
            .await
            .unwrap();

        assert!(response.upload_url.contains(&id));
        let stored = f.service.find(OWNER, created.equipment_id).await.unwrap().unwrap();
        let expected_prefix = format!("http://localhost:9000/attachments/{}?t=", id);
        assert!(stored.attachment_url.starts_with(&expected_prefix));
        assert_eq!(stored.status, EquipmentStatus::Up);
        assert_eq!(
            *f.latency.samples.lock().unwrap(),
            vec![GENERATE_UPLOAD_URL_METRIC.to_string()]
        );
    }

    #[tokio::test]
    async fn test_upload_url_failure_still_records_latency() {
        let f = fixture(RecordingStorage::default());

        let result = f
            .service
            .create_attachment_upload_url(OWNER, Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(f.latency.samples.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_versioned_attachment_url() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            versioned_attachment_url("http://cdn/bucket/abc", now),
            "http://cdn/bucket/abc?t=1704067200000"
        );
    }
}
