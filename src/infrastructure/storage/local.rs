use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::blob::{BlobStorage, StorageError, StorageResult};

/// Filesystem-backed blob store rooted at a single directory, mirroring
/// the `storage/app/public` layout served under `/storage/{key}`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a storage key onto a path under the root. Keys must be
    /// relative and must not climb out of the root.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty storage key".to_string()));
        }
        if key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "unsafe storage key: {}",
                key
            )));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        tracing::debug!(key = %key, size_bytes = data.len(), "stored blob");
        Ok(())
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        Ok(fs::read(&path).await?)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await?;
        tracing::debug!(key = %key, "deleted blob");
        Ok(())
    }
}
