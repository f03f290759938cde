//! Location of the per-user vault directory and the files inside it.

use std::path::{Path, PathBuf};

use crate::error::PathError;

/// Name of the vault directory under the user's home directory.
pub const DEFAULT_DIR_NAME: &str = ".namaste-cloud";

/// Plaintext active-provider config.
pub const CONFIG_FILE: &str = "config.json";

/// Encrypted credential map.
pub const CREDENTIALS_FILE: &str = "credentials.enc";

/// Raw 32-byte encryption key.
pub const KEY_FILE: &str = "keyfile";

/// Resolved vault directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    dir: PathBuf,
}

impl VaultPaths {
    /// Use an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the vault directory: `explicit` when given, otherwise
    /// `<home>/.namaste-cloud`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NoHomeDir`] if no explicit directory is given and
    /// the home directory cannot be determined.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, PathError> {
        if let Some(dir) = explicit {
            return Ok(Self::new(dir));
        }
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        Ok(Self::new(home.join(DEFAULT_DIR_NAME)))
    }

    /// The vault directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `config.json`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Path of the encrypted credential file.
    #[must_use]
    pub fn credentials_file(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Path of the raw key file.
    #[must_use]
    pub fn key_file(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }
}
