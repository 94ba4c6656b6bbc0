//! Persistent store for the studio aggregate.
//!
//! [`StudioRepository`] reads and writes the **whole** aggregate under one
//! storage key:
//!
//! - `load()` returns the stored aggregate merged over the configured
//!   defaults, or the defaults when nothing is stored.
//! - `save()` serializes the entire aggregate and overwrites what was there.
//!
//! There are no partial writes and no locking here. Two callers that both
//! load, mutate and save race, and the second save silently discards the
//! first caller's change. [`crate::service::StudioService`] serializes its
//! mutations to rule that out; use the repository directly only from a
//! single writer.
//!
//! # Failures
//!
//! A failed save (backend down, quota exceeded) is logged and returned.
//! The caller's in-memory aggregate keeps the mutation, so it no longer
//! matches storage; nothing is rolled back or retried.

use crate::backend::StorageBackend;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::observability::{NoOpMetrics, StoreMetrics};
use crate::serialization::{decode_studio_data, encode_studio_data};
use crate::studio::StudioData;
use std::time::Instant;

/// Whole-aggregate load/save over a storage backend.
///
/// # Example
///
/// ```no_run
/// use studio_ledger::backend::InMemoryBackend;
/// use studio_ledger::repository::StudioRepository;
///
/// # async fn example() -> studio_ledger::Result<()> {
/// let repo = StudioRepository::new(InMemoryBackend::new());
///
/// let mut data = repo.load().await?;
/// data.whatsapp_credits += 100;
/// repo.save(&data).await?;
/// # Ok(())
/// # }
/// ```
pub struct StudioRepository<B: StorageBackend> {
    backend: B,
    config: StoreConfig,
    metrics: Box<dyn StoreMetrics>,
}

impl<B: StorageBackend> StudioRepository<B> {
    /// Create a repository with the default configuration.
    pub fn new(backend: B) -> Self {
        StudioRepository {
            backend,
            config: StoreConfig::default(),
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Create a repository with a custom configuration.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the configuration is invalid.
    pub fn with_config(backend: B, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(StudioRepository {
            backend,
            config,
            metrics: Box::new(NoOpMetrics),
        })
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn StoreMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn metrics(&self) -> &dyn StoreMetrics {
        self.metrics.as_ref()
    }

    /// Load the aggregate.
    ///
    /// # Errors
    ///
    /// - `Error::BackendError`: storage could not be read
    /// - `Error::DeserializationError`: the stored value is not a valid aggregate
    pub async fn load(&self) -> Result<StudioData> {
        let timer = Instant::now();
        let key = self.config.storage_key.as_str();

        let stored = match self.backend.get(key).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Error loading studio data from {}: {}", key, e);
                self.metrics.record_error("load", &e.to_string());
                return Err(e);
            }
        };

        let Some(bytes) = stored else {
            debug!("No studio data under {}, using defaults", key);
            self.metrics.record_load(key, 0, timer.elapsed());
            return Ok(self.config.default_data());
        };

        match decode_studio_data(&bytes, &self.config.default_data()) {
            Ok(data) => {
                self.metrics.record_load(key, bytes.len(), timer.elapsed());
                Ok(data)
            }
            Err(e) => {
                error!("Error loading studio data from {}: {}", key, e);
                self.metrics.record_error("load", &e.to_string());
                Err(e)
            }
        }
    }

    /// Overwrite the stored aggregate with `data`.
    ///
    /// # Errors
    ///
    /// - `Error::SerializationError`: the aggregate could not be encoded
    /// - `Error::BackendError` / `Error::QuotaExceeded`: the write failed
    pub async fn save(&self, data: &StudioData) -> Result<()> {
        let timer = Instant::now();
        let key = self.config.storage_key.as_str();

        let result = match encode_studio_data(data) {
            Ok(bytes) => {
                let size = bytes.len();
                self.backend.set(key, bytes).await.map(|()| size)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(size) => {
                self.metrics.record_save(key, size, timer.elapsed());
                Ok(())
            }
            Err(e) => {
                error!("Error saving studio data to {}: {}", key, e);
                self.metrics.record_error("save", &e.to_string());
                Err(e)
            }
        }
    }

    /// Remove the stored aggregate; the next load returns the defaults.
    ///
    /// # Errors
    /// Returns `Err` if the backend delete fails.
    pub async fn clear(&self) -> Result<()> {
        self.backend.delete(&self.config.storage_key).await?;
        warn!("Studio data under {} cleared", self.config.storage_key);
        Ok(())
    }

    /// True if an aggregate has been saved under the configured key.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be read.
    pub async fn is_initialized(&self) -> Result<bool> {
        self.backend.exists(&self.config.storage_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::Error;

    #[tokio::test]
    async fn test_load_empty_returns_defaults() {
        let repo = StudioRepository::new(InMemoryBackend::new());

        let data = repo.load().await.expect("Failed to load");
        assert_eq!(data, StudioData::default());
        assert!(!repo.is_initialized().await.unwrap());
    }

    #[tokio::test]
    async fn test_load_uses_configured_defaults() {
        let config = StoreConfig::default().with_initial_credits(50);
        let repo = StudioRepository::with_config(InMemoryBackend::new(), config).unwrap();

        assert_eq!(repo.load().await.unwrap().whatsapp_credits, 50);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = StudioRepository::new(InMemoryBackend::new());

        let mut data = repo.load().await.unwrap();
        data.whatsapp_credits = 123;
        repo.save(&data).await.expect("Failed to save");

        assert!(repo.is_initialized().await.unwrap());
        assert_eq!(repo.load().await.unwrap().whatsapp_credits, 123);
    }

    #[tokio::test]
    async fn test_save_uses_storage_key() {
        let backend = InMemoryBackend::new();
        let config = StoreConfig::default().with_storage_key("branch-2");
        let repo = StudioRepository::with_config(backend.clone(), config).unwrap();

        repo.save(&StudioData::default()).await.unwrap();

        assert!(backend.exists("branch-2").await.unwrap());
        assert!(!backend.exists("studioData").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_data_is_an_error() {
        let backend = InMemoryBackend::new();
        backend
            .set("studioData", b"{\"customers\": 5".to_vec())
            .await
            .unwrap();
        let repo = StudioRepository::new(backend.clone());

        assert!(matches!(
            repo.load().await,
            Err(Error::DeserializationError(_))
        ));
        // The stored bytes are left untouched
        assert!(backend.exists("studioData").await.unwrap());
    }

    #[tokio::test]
    async fn test_quota_failure_surfaces() {
        let repo = StudioRepository::new(InMemoryBackend::with_quota(16));

        let result = repo.save(&StudioData::default()).await;
        assert!(matches!(result, Err(Error::QuotaExceeded { .. })));
        assert!(!repo.is_initialized().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear() {
        let repo = StudioRepository::new(InMemoryBackend::new());
        let mut data = StudioData::default();
        data.whatsapp_credits = 1;
        repo.save(&data).await.unwrap();

        repo.clear().await.unwrap();

        assert_eq!(repo.load().await.unwrap().whatsapp_credits, 500);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StoreConfig::default().with_storage_key("");
        assert!(StudioRepository::with_config(InMemoryBackend::new(), config).is_err());
    }

    #[tokio::test]
    async fn test_last_writer_wins_without_serialization() {
        let repo = StudioRepository::new(InMemoryBackend::new());

        // Two writers load the same state...
        let mut first = repo.load().await.unwrap();
        let mut second = repo.load().await.unwrap();

        first.whatsapp_credits += 100;
        second.whatsapp_credits -= 1;

        // ...and the second save discards the first writer's change.
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        assert_eq!(repo.load().await.unwrap().whatsapp_credits, 499);
    }
}
