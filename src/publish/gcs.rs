// src/publish/gcs.rs

use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::{
        buckets::get::GetBucketRequest,
        objects::upload::{Media, UploadObjectRequest, UploadType},
    },
};
use tokio::fs::File;
use tracing::debug;

use super::BlobStore;
use crate::error::{IngestError, Result, StoreError};

/// Google Cloud Storage, authenticated with Application Default Credentials.
pub struct GcsStore {
    client: Client,
}

impl GcsStore {
    pub async fn connect() -> Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| IngestError::StoreConnect(Box::new(e)))?;
        Ok(Self {
            client: Client::new(config),
        })
    }
}

impl BlobStore for GcsStore {
    fn scheme(&self) -> &str {
        "gs"
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        len: u64,
    ) -> std::result::Result<(), StoreError> {
        // fail on a missing bucket before sending the body
        self.client
            .get_bucket(&GetBucketRequest {
                bucket: bucket.to_string(),
                ..Default::default()
            })
            .await?;
        debug!(bucket, "bucket resolved");

        let mut media = Media::new(key.to_string());
        media.content_length = Some(len);
        let request = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        // streamed from disk, never buffered whole
        self.client
            .upload_object(&request, body, &UploadType::Simple(media))
            .await?;
        Ok(())
    }
}
