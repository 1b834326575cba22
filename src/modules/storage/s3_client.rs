//! S3-compatible attachment storage client
//!
//! Issues presigned upload URLs, deletes objects, and keeps the
//! attachment bucket publicly readable so stored attachment URLs resolve
//! without signing.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::AttachmentStorage;
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub struct S3StorageClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    presigned_url_expiry_secs: u32,
    endpoint: String,
    public_endpoint: String,
    access_key: String,
    secret_key: String,
    region_name: String,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl S3StorageClient {
    /// Create the client, making sure the bucket exists and is publicly readable
    pub async fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to open bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) for MinIO and friends
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            bucket,
            region,
            credentials,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        };

        client.ensure_bucket_exists().await;
        client.set_public_read_policy().await;

        info!(
            "Attachment storage initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Create the bucket unless it is already there. Never fails startup.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    /// Allow anonymous reads of every object in the bucket. Never fails startup.
    async fn set_public_read_policy(&self) {
        let bucket_name = self.bucket.name();
        let policy = public_read_policy(&bucket_name).to_string();

        match self
            .put_bucket_policy_with_sigv4(&bucket_name, &policy)
            .await
        {
            Ok(_) => info!("Set public read policy for {}/*", bucket_name),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. \
                You may need to set the policy manually using: \
                mc anonymous set download minio/{}",
                bucket_name, e, bucket_name
            ),
        }
    }

    /// Put bucket policy using AWS Signature v4
    async fn put_bucket_policy_with_sigv4(
        &self,
        bucket_name: &str,
        policy: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Storage(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Storage("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let url = format!("{}/{}?policy", self.endpoint, bucket_name);
        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));

        let canonical_uri = format!("/{}", bucket_name);
        let canonical_querystring = "policy=";
        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host_header, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n{}\n{}\n{}\n{}\n{}",
            canonical_uri, canonical_querystring, canonical_headers, signed_headers, payload_hash
        );

        let algorithm = "AWS4-HMAC-SHA256";
        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region_name);
        let canonical_request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            algorithm, amz_date, credential_scope, canonical_request_hash
        );

        let signature =
            sigv4_signature(&self.secret_key, &self.region_name, &date_stamp, &string_to_sign)?;

        let authorization_header = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            algorithm, self.access_key, credential_scope, signed_headers, signature
        );

        let response = self
            .http_client
            .put(&url)
            .header("Host", &host_header)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", &authorization_header)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::Storage(format!(
                "Failed to set bucket policy: {} - {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl AttachmentStorage for S3StorageClient {
    fn object_url(&self, key: &str) -> String {
        object_url(&self.public_endpoint, &self.bucket.name(), key)
    }

    async fn presigned_upload_url(&self, key: &str) -> Result<String, AppError> {
        self.bucket
            .presign_put(key, self.presigned_url_expiry_secs, None, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate presigned upload URL for '{}': {}",
                    key, e
                ))
            })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete object '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) && status != 404 {
            return Err(AppError::Storage(format!(
                "Failed to delete object '{}': HTTP {}",
                key, status
            )));
        }

        debug!("Deleted object '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}

/// Path-style public URL of an object
pub fn object_url(public_endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", public_endpoint.trim_end_matches('/'), bucket, key)
}

fn public_read_policy(bucket_name: &str) -> serde_json::Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": {"AWS": "*"},
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket_name}/*")]
            }
        ]
    })
}

/// Calculate an AWS Signature v4 signature
fn sigv4_signature(
    secret_key: &str,
    region_name: &str,
    date_stamp: &str,
    string_to_sign: &str,
) -> Result<String, AppError> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region_name.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;

    let signature = hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
    Ok(hex::encode(signature))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Storage(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
