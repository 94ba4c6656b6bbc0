//! Observability hooks for store operations.
//!
//! Implement [`StoreMetrics`] to feed store activity into a monitoring
//! system:
//!
//! ```ignore
//! use studio_ledger::observability::StoreMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl StoreMetrics for PrometheusMetrics {
//!     fn record_save(&self, key: &str, bytes: usize, duration: Duration) {
//!         // histogram!("studio_save_bytes").record(bytes as f64);
//!     }
//!     // ... other methods keep their log-based defaults
//! }
//!
//! // let service = StudioService::new(backend).with_metrics(Box::new(PrometheusMetrics));
//! ```
//!
//! The default methods log through the `log` crate. The service installs
//! [`NoOpMetrics`] unless told otherwise.

use std::time::Duration;

/// Trait for store metrics collection.
pub trait StoreMetrics: Send + Sync {
    /// Record a full-aggregate load.
    fn record_load(&self, key: &str, bytes: usize, duration: Duration) {
        debug!("Store LOAD: {} ({} bytes) took {:?}", key, bytes, duration);
    }

    /// Record a full-aggregate save.
    fn record_save(&self, key: &str, bytes: usize, duration: Duration) {
        debug!("Store SAVE: {} ({} bytes) took {:?}", key, bytes, duration);
    }

    /// Record a completed mutation, e.g. `"add_payment"`.
    fn record_mutation(&self, operation: &str, duration: Duration) {
        debug!("Store MUTATION: {} took {:?}", operation, duration);
    }

    /// Record a failed operation.
    fn record_error(&self, operation: &str, error: &str) {
        warn!("Store ERROR in {}: {}", operation, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl StoreMetrics for NoOpMetrics {
    fn record_load(&self, _key: &str, _bytes: usize, _duration: Duration) {}
    fn record_save(&self, _key: &str, _bytes: usize, _duration: Duration) {}
    fn record_mutation(&self, _operation: &str, _duration: Duration) {}
    fn record_error(&self, _operation: &str, _error: &str) {}
}

/// Metrics that only log, using the trait defaults.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl StoreMetrics for LogMetrics {}
