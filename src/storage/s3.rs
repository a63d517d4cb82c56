// src/storage/s3.rs

//! AWS S3 blob store implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::config::AwsConfig;
use crate::error::{AppError, Result};
use crate::storage::{content_type_for, BlobStore};

/// S3-backed blob store scoped to a single bucket.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a store from an existing client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a store from the application configuration.
    ///
    /// Explicit credentials in the config win; otherwise the SDK's default
    /// chain (environment, shared credentials file, instance roles, SSO)
    /// applies.
    pub async fn from_config(config: &AwsConfig, operation_timeout: Duration) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(operation_timeout)
                    .build(),
            );

        if let (Some(key_id), Some(secret)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "secrets-config",
            ));
        }

        let sdk_config = loader.load().await;
        Ok(Self::new(Client::new(&sdk_config), config.s3_bucket.clone()))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| AppError::blob_store(format!("put s3://{}/{key}: {e}", self.bucket)))?;

        debug!(bucket = %self.bucket, key, "wrote object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output.body.collect().await.map_err(|e| {
                    AppError::blob_store(format!(
                        "collect body for s3://{}/{key}: {e}",
                        self.bucket
                    ))
                })?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_no_such_key() {
                        debug!(bucket = %self.bucket, key, "object not found");
                        return Ok(None);
                    }
                }
                Err(AppError::blob_store(format!(
                    "get s3://{}/{key}: {err}",
                    self.bucket
                )))
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                if let SdkError::ServiceError(service_err) = &err {
                    if service_err.err().is_not_found() {
                        return Ok(false);
                    }
                }
                Err(AppError::blob_store(format!(
                    "head s3://{}/{key}: {err}",
                    self.bucket
                )))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // S3 DeleteObject succeeds on missing keys, which gives us
        // idempotency for free.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::blob_store(format!("delete s3://{}/{key}: {e}", self.bucket))
            })?;
        Ok(())
    }
}
