use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bucket event notification as delivered by S3-compatible stores.
///
/// Records stay raw JSON here and are parsed one by one, so a malformed
/// record cannot take the rest of the notification down with it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorageEventNotification {
    #[serde(rename = "Records", default)]
    #[schema(value_type = Vec<StorageEventRecord>)]
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageEventRecord {
    /// e.g. `s3:ObjectCreated:Put` or `ObjectRemoved:Delete`
    pub event_name: String,
    pub event_time: DateTime<Utc>,
    pub s3: StorageEventEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorageEventEntity {
    pub object: StorageObject,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorageObject {
    /// URL-encoded object key
    pub key: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(rename = "eTag", default)]
    pub e_tag: Option<String>,
    #[serde(default)]
    pub sequencer: Option<String>,
}
