//! Key-value storage backends the aggregate is persisted to.

use crate::error::Result;

pub mod file;
pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

pub use file::FileBackend;
pub use inmemory::InMemoryBackend;
#[cfg(feature = "redis")]
pub use redis::{PoolStats, RedisBackend, RedisConfig};

/// Trait for storage backend implementations.
///
/// A backend is a flat map from string keys to byte values, the same shape
/// as browser local storage. The store keeps the whole aggregate under a
/// single key and always replaces it whole.
///
/// **IMPORTANT:** All methods use `&self` instead of `&mut self` to allow concurrent access.
/// Backend implementations should use interior mutability or external storage.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync + Clone {
    /// Retrieve the value stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value present
    /// - `Ok(None)` - Nothing stored under this key
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns `Err` if the write fails, including quota rejections.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be written.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a value is stored under `key`.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be read.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Health check - verify the backend is reachable.
    ///
    /// # Errors
    /// Returns `Err` if the backend is not accessible.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Optional: remove every key (use with caution).
    ///
    /// # Errors
    /// Returns `Err` if the operation is not implemented or fails.
    async fn clear_all(&self) -> Result<()> {
        Err(crate::error::Error::NotImplemented(
            "clear_all not implemented for this backend".to_string(),
        ))
    }
}
