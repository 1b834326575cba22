use async_trait::async_trait;

use crate::core::error::AppError;

/// Object store holding equipment attachments, keyed by equipment id
#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// Direct URL under which the object is publicly readable
    fn object_url(&self, key: &str) -> String;

    /// Time-limited URL allowing a single HTTP PUT of the object
    async fn presigned_upload_url(&self, key: &str) -> Result<String, AppError>;

    /// Remove the object; a missing object is not an error
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
