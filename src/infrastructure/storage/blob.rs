use async_trait::async_trait;
use derive_more::Display;

/// Errors surfaced by blob storage backends.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[display("Blob not found: {_0}")]
    NotFound(String),
    #[display("Invalid storage key: {_0}")]
    InvalidKey(String),
    #[display("Storage I/O failure: {_0}")]
    Io(String),
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Flat key/value blob store. Keys are relative, slash-separated paths
/// such as `images/AbC123.jpg`; backends decide where the bytes live.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Writes `data` under `key`, creating parent directories as needed
    /// and replacing any previous blob at the same key.
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Reads the blob at `key`, or `StorageError::NotFound`.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Removes the blob at `key`. Deleting a key that does not exist is
    /// not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
