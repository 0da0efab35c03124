//! Artifact storage for rendered reports.
//!
//! `AppState` holds an `Arc<dyn ArtifactStore>`; production uses S3 (or MinIO
//! locally), tests swap in an in-memory map.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Bytes, AppError>;
}

pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

        info!("Uploaded artifact to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("download of {key} failed: {e}")))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::S3(format!("reading {key} failed: {e}")))?;
        Ok(data.into_bytes())
    }
}

/// Report key layout: one folder per result, one file per render job.
pub fn report_key(result_id: uuid::Uuid, job_id: uuid::Uuid) -> String {
    format!("reports/{result_id}/{job_id}.html")
}
