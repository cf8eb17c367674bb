// src/publish/dir.rs

use std::path::{Component, Path, PathBuf};
use tokio::{
    fs::{self, File},
    io,
};

use super::BlobStore;
use crate::error::StoreError;

/// Object store backed by a local directory: `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where `bucket`/`key` lives on disk. Keys that would escape the bucket
    /// directory are refused.
    pub fn object_path(&self, bucket: &str, key: &str) -> Option<PathBuf> {
        let rel = Path::new(key);
        let safe = !bucket.is_empty()
            && !bucket.contains('/')
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        safe.then(|| self.root.join(bucket).join(rel))
    }
}

impl BlobStore for DirStore {
    fn scheme(&self) -> &str {
        "file"
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        mut body: File,
        len: u64,
    ) -> Result<(), StoreError> {
        let path = self
            .object_path(bucket, key)
            .ok_or_else(|| format!("key `{}` is not a plain relative path", key))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut out = File::create(&path).await?;
        let copied = io::copy(&mut body, &mut out).await?;
        if copied != len {
            return Err(format!("wrote {} of {} bytes to {}", copied, len, path.display()).into());
        }
        Ok(())
    }
}
