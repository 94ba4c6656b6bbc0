//! Store configuration.
//!
//! Configuration is a hard-coded default record; there is no environment
//! or file lookup. Override individual values with the `with_*` builders.
//!
//! ```
//! use studio_ledger::config::StoreConfig;
//!
//! let config = StoreConfig::default()
//!     .with_storage_key("branch-2")
//!     .with_initial_credits(1000);
//!
//! assert_eq!(config.default_data().whatsapp_credits, 1000);
//! ```

use crate::error::{Error, Result};
use crate::key::DEFAULT_STORAGE_KEY;
use crate::studio::{StudioData, StudioSettings, DEFAULT_WHATSAPP_CREDITS};

#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Key the whole aggregate is stored under.
    pub storage_key: String,

    /// Credit counter of a studio that has never been saved.
    pub initial_credits: i64,

    /// Settings of a studio that has never been saved.
    ///
    /// A stored `settings` object replaces these wholesale on load; fields
    /// missing from the stored object are not filled in from here.
    pub settings: StudioSettings,

    /// Seed demo customers and events into an empty studio when the
    /// service is opened.
    pub seed_sample_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            initial_credits: DEFAULT_WHATSAPP_CREDITS,
            settings: StudioSettings::default(),
            seed_sample_data: false,
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_initial_credits(mut self, credits: i64) -> Self {
        self.initial_credits = credits;
        self
    }

    pub fn with_settings(mut self, settings: StudioSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sample_data(mut self, seed: bool) -> Self {
        self.seed_sample_data = seed;
        self
    }

    /// The aggregate a load returns when nothing has been stored yet, and the
    /// base that stored top-level fields are merged over.
    pub fn default_data(&self) -> StudioData {
        StudioData {
            whatsapp_credits: self.initial_credits,
            settings: self.settings.clone(),
            ..StudioData::default()
        }
    }

    /// Reject configurations a store cannot run with.
    ///
    /// # Errors
    /// `Error::ConfigError` for a blank storage key or negative initial credits.
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(Error::ConfigError("storage key must not be blank".into()));
        }
        if self.initial_credits < 0 {
            return Err(Error::ConfigError(format!(
                "initial credits must not be negative, got {}",
                self.initial_credits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "studioData");
        assert_eq!(config.initial_credits, 500);
        assert!(!config.seed_sample_data);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_data_uses_overrides() {
        let settings = StudioSettings {
            studio_name: "Lens & Light".into(),
            studio_phone: "+91-9000000000".into(),
            studio_email: "hello@lensandlight.in".into(),
            gst_number: None,
        };
        let data = StoreConfig::default()
            .with_initial_credits(42)
            .with_settings(settings.clone())
            .default_data();

        assert_eq!(data.whatsapp_credits, 42);
        assert_eq!(data.settings, settings);
        assert!(data.customers.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        let config = StoreConfig::default().with_storage_key("  ");
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_negative_credits() {
        let config = StoreConfig::default().with_initial_credits(-1);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }
}
