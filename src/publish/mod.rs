// src/publish/mod.rs

use std::path::Path;
use tokio::fs::File;
use tracing::{info, instrument};

use crate::error::{IngestError, Result, StoreError};

pub mod dir;
pub mod gcs;

pub use dir::DirStore;
pub use gcs::GcsStore;

/// A write-once blob sink addressed by `(bucket, key)`.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// URI scheme of the addresses this store hands out, e.g. `gs`.
    fn scheme(&self) -> &str;

    /// Stream `len` bytes of `body` to `key` in `bucket`, replacing whatever
    /// was there.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        len: u64,
    ) -> std::result::Result<(), StoreError>;
}

/// Canonical `scheme://bucket/key` address of an object.
pub fn location(scheme: &str, bucket: &str, key: &str) -> String {
    format!("{}://{}/{}", scheme, bucket, key)
}

/// Upload `local_path` to `bucket`/`key` and return where it landed.
#[instrument(level = "info", skip(store, local_path), fields(file = %local_path.display()))]
pub async fn upload_to_cloud<B: BlobStore>(
    store: &B,
    local_path: &Path,
    bucket: &str,
    key: &str,
) -> Result<String> {
    let target = location(store.scheme(), bucket, key);
    info!("uploading {} to {}", local_path.display(), target);

    let read_err = |e: std::io::Error| IngestError::io(format!("reading {}", local_path.display()), e);
    let file = File::open(local_path).await.map_err(read_err)?;
    let len = file.metadata().await.map_err(read_err)?.len();

    store
        .put(bucket, key, file, len)
        .await
        .map_err(|source| IngestError::Store {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })?;

    info!(bytes = len, "...uploaded to {}", target);
    Ok(target)
}
