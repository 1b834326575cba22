//! Storage module for equipment attachments
//!
//! Provides an S3-compatible client for presigned uploads and deletion.

mod attachment_storage;
mod s3_client;

pub use attachment_storage::AttachmentStorage;
pub use s3_client::S3StorageClient;
