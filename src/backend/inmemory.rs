//! In-memory storage backend (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding. An optional
//! byte quota makes writes fail the way a full browser storage area does.

use super::StorageBackend;
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe async in-memory storage backend.
///
/// Clones share the same map, so a clone handed to a second store sees
/// every write of the first.
///
/// # Example
///
/// ```no_run
/// use studio_ledger::backend::{InMemoryBackend, StorageBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///
///     backend.set("studioData", b"{}".to_vec()).await?;
///     assert!(backend.get("studioData").await?.is_some());
///
///     // A 1 KiB quota rejects anything larger.
///     let small = InMemoryBackend::with_quota(1024);
///     assert!(small.set("studioData", vec![b' '; 4096]).await.is_err());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl InMemoryBackend {
    /// Create a new unbounded in-memory backend.
    pub fn new() -> Self {
        InMemoryBackend {
            store: Arc::new(DashMap::new()),
            quota: None,
        }
    }

    /// Create a backend that holds at most `bytes` across all values.
    pub fn with_quota(bytes: usize) -> Self {
        InMemoryBackend {
            store: Arc::new(DashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Get the current number of keys.
    pub async fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get memory statistics.
    pub async fn stats(&self) -> StorageStats {
        StorageStats {
            total_entries: self.store.len(),
            total_bytes: self.total_bytes(),
            quota_bytes: self.quota,
        }
    }

    /// Print storage statistics to debug log.
    pub async fn log_stats(&self) {
        let stats = self.stats().await;
        debug!(
            "Storage Stats: {} entries, {} bytes (quota: {:?})",
            stats.total_entries, stats.total_bytes, stats.quota_bytes
        );
    }

    fn total_bytes(&self) -> usize {
        self.store.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.store.get(key) {
            Some(entry) => {
                debug!("✓ InMemory GET {} -> HIT", key);
                Ok(Some(entry.value().clone()))
            }
            None => {
                debug!("✓ InMemory GET {} -> MISS", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if let Some(limit) = self.quota {
            let replaced = self.store.get(key).map(|e| e.value().len()).unwrap_or(0);
            let requested = self.total_bytes() - replaced + value.len();
            if requested > limit {
                warn!(
                    "✗ InMemory SET {} rejected: {} bytes over quota of {}",
                    key, requested, limit
                );
                return Err(Error::QuotaExceeded { limit, requested });
            }
        }

        let size = value.len();
        self.store.insert(key.to_string(), value);
        debug!("✓ InMemory SET {} ({} bytes)", key, size);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        debug!("✓ InMemory DELETE {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn clear_all(&self) -> Result<()> {
        self.store.clear();
        warn!("⚠ InMemory CLEAR_ALL executed - all stored data removed!");
        Ok(())
    }
}

/// Storage statistics.
#[derive(Clone, Debug)]
pub struct StorageStats {
    pub total_entries: usize,
    pub total_bytes: usize,
    pub quota_bytes: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inmemory_backend_set_get() {
        let backend = InMemoryBackend::new();

        backend
            .set("key1", b"value1".to_vec())
            .await
            .expect("Failed to set");

        let result = backend.get("key1").await.expect("Failed to get");
        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_inmemory_backend_miss() {
        let backend = InMemoryBackend::new();

        let result = backend.get("nonexistent").await.expect("Failed to get");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_inmemory_backend_overwrite() {
        let backend = InMemoryBackend::new();

        backend.set("key1", b"first".to_vec()).await.unwrap();
        backend.set("key1", b"second".to_vec()).await.unwrap();

        assert_eq!(backend.len().await, 1);
        assert_eq!(
            backend.get("key1").await.unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[tokio::test]
    async fn test_inmemory_backend_delete() {
        let backend = InMemoryBackend::new();

        backend
            .set("key1", b"value1".to_vec())
            .await
            .expect("Failed to set");
        assert!(backend
            .exists("key1")
            .await
            .expect("Failed to check exists"));

        backend.delete("key1").await.expect("Failed to delete");
        assert!(!backend
            .exists("key1")
            .await
            .expect("Failed to check exists"));

        // Deleting again is a no-op
        backend.delete("key1").await.expect("Failed to delete");
    }

    #[tokio::test]
    async fn test_inmemory_backend_quota() {
        let backend = InMemoryBackend::with_quota(10);

        backend.set("a", vec![0; 6]).await.expect("fits");

        let err = backend.set("b", vec![0; 6]).await.unwrap_err();
        assert_eq!(
            err,
            Error::QuotaExceeded {
                limit: 10,
                requested: 12
            }
        );
        assert!(!backend.exists("b").await.unwrap());

        // Replacing a value only counts the difference
        backend.set("a", vec![0; 10]).await.expect("replace fits");
        assert_eq!(backend.stats().await.total_bytes, 10);
    }

    #[tokio::test]
    async fn test_inmemory_backend_clear_all() {
        let backend = InMemoryBackend::new();

        backend.set("key1", b"value1".to_vec()).await.unwrap();
        backend.set("key2", b"value2".to_vec()).await.unwrap();

        assert_eq!(backend.len().await, 2);

        backend.clear_all().await.expect("Failed to clear");

        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_inmemory_backend_stats() {
        let backend = InMemoryBackend::new();

        backend.set("key1", b"value_with_data".to_vec()).await.unwrap();
        backend.set("key2", b"data".to_vec()).await.unwrap();

        let stats = backend.stats().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_bytes, 19);
        assert_eq!(stats.quota_bytes, None);
    }

    #[tokio::test]
    async fn test_inmemory_backend_clone_shares_store() {
        let backend1 = InMemoryBackend::new();
        backend1.set("key", b"value".to_vec()).await.unwrap();

        let backend2 = backend1.clone();
        assert_eq!(
            backend2.get("key").await.unwrap(),
            Some(b"value".to_vec())
        );
    }

    #[tokio::test]
    async fn test_inmemory_backend_thread_safe() {
        let backend = InMemoryBackend::new();
        let mut handles = vec![];

        for i in 0..10 {
            let b = backend.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key_{}", i);
                b.set(&key, format!("value_{}", i).into_bytes())
                    .await
                    .expect("Failed to set");
            }));
        }

        for handle in handles {
            handle.await.expect("Task failed");
        }

        assert_eq!(backend.len().await, 10);
    }
}
