//! Active-provider config.
//!
//! A small plaintext JSON record, `{"active_cloud": "aws"}`, naming the
//! provider commands act on by default. It holds no secrets and is never
//! encrypted. An empty selector means nothing has been chosen yet.

use std::fmt;
use std::sync::Arc;

use namaste_storage::StorageBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::paths::CONFIG_FILE;
use crate::provider::Provider;

/// The persisted config record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Identifier of the active provider; empty when none is selected.
    #[serde(default)]
    pub active_cloud: String,
}

/// Reads and writes `config.json`.
pub struct ConfigStore {
    storage: Arc<dyn StorageBackend>,
}

impl ConfigStore {
    /// Create a config store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Load the config, or the zero value if the file does not exist.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Decode`] if the file is not valid config JSON.
    /// - [`ConfigError::Storage`] if the file cannot be read.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let Some(bytes) = self.storage.get(CONFIG_FILE)? else {
            debug!("no config file, using defaults");
            return Ok(Config::default());
        };
        serde_json::from_slice(&bytes).map_err(|e| ConfigError::Decode {
            reason: e.to_string(),
        })
    }

    /// Overwrite the config file with `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Serialization`] if the record cannot be encoded.
    /// - [`ConfigError::Storage`] if the file cannot be written.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let mut bytes = serde_json::to_vec(config).map_err(|e| ConfigError::Serialization {
            reason: e.to_string(),
        })?;
        bytes.push(b'\n');
        self.storage.put(CONFIG_FILE, &bytes)?;
        debug!(active_cloud = %config.active_cloud, "saved config");
        Ok(())
    }

    /// Make `provider` the active provider, keeping the rest of the config.
    ///
    /// # Errors
    ///
    /// Every error of [`load`](Self::load) and [`save`](Self::save).
    pub fn set_active(&self, provider: Provider) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.active_cloud = provider.to_string();
        self.save(&config)
    }

    /// The active provider.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoActiveProvider`] if the selector is empty.
    /// - [`ConfigError::Provider`] if the selector names an unsupported provider.
    /// - Every error of [`load`](Self::load).
    pub fn load_active_provider(&self) -> Result<Provider, ConfigError> {
        let config = self.load()?;
        if config.active_cloud.trim().is_empty() {
            return Err(ConfigError::NoActiveProvider);
        }
        Ok(config.active_cloud.parse()?)
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore").finish_non_exhaustive()
    }
}
