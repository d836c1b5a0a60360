//! Object storage for uploaded documents.
//!
//! Browsers upload and download directly through presigned URLs; the
//! server only reads objects back for extraction and deletes them.

use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;

use crate::config::StorageConfig;
use crate::error::CloudError;

/// Operations the API and worker need from an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// URL a client can `PUT` the object to until `ttl` elapses.
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration) -> Result<String, CloudError>;

    /// URL a client can `GET` the object from until `ttl` elapses.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, CloudError>;

    /// Read a whole object into memory.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, CloudError>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete_object(&self, key: &str) -> Result<(), CloudError>;
}

/// [`ObjectStore`] backed by S3 or an S3-compatible server such as MinIO.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client from configuration.
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(id, secret, None, None, "sonora-env"));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            bucket = %config.bucket,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Object store configured"
        );

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }

    fn presigning(ttl: Duration) -> Result<PresigningConfig, CloudError> {
        PresigningConfig::expires_in(ttl).map_err(|e| CloudError::Config(e.to_string()))
    }
}

fn storage_error<E: std::error::Error>(err: E) -> CloudError {
    CloudError::Storage(DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration) -> Result<String, CloudError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning(ttl)?)
            .await
            .map_err(storage_error)?;
        Ok(request.uri().to_string())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, CloudError> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presigning(ttl)?)
            .await
            .map_err(storage_error)?;
        Ok(request.uri().to_string())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, CloudError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(storage_error)?;
        let data = output.body.collect().await.map_err(storage_error)?;
        Ok(data.into_bytes().to_vec())
    }

    async fn delete_object(&self, key: &str) -> Result<(), CloudError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(storage_error)?;
        tracing::debug!(key, "Object deleted");
        Ok(())
    }
}
