//! Lifecycle of the single vault encryption key.
//!
//! The key is created lazily the first time it is needed, persisted as 32 raw
//! bytes with owner-only permissions, and loaded on every later access. There
//! is no rotation: deleting the key file makes every stored credential
//! unreadable.

use std::sync::Arc;

use namaste_storage::StorageBackend;
use tracing::{debug, info, warn};

use crate::crypto::{EncryptionKey, KEY_LEN};
use crate::error::KeyError;
use crate::paths::{CREDENTIALS_FILE, KEY_FILE};

/// Loads or creates the vault key through a storage backend.
pub struct KeyStore {
    storage: Arc<dyn StorageBackend>,
}

impl KeyStore {
    /// Create a key store over `storage`. The key is read lazily.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Return the persisted key, generating and persisting one if none exists.
    ///
    /// # Errors
    ///
    /// - [`KeyError::InvalidLength`] if the key file is not exactly 32 bytes.
    /// - [`KeyError::Generate`] if the OS random generator fails.
    /// - [`KeyError::Storage`] if the key cannot be read or written.
    pub fn load_or_create(&self) -> Result<EncryptionKey, KeyError> {
        match self.storage.get(KEY_FILE)? {
            Some(mut bytes) => {
                let loaded = <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map(EncryptionKey::from_bytes);
                let actual = bytes.len();
                zeroize::Zeroize::zeroize(&mut bytes);
                let key = loaded.map_err(|_| KeyError::InvalidLength {
                    expected: KEY_LEN,
                    actual,
                })?;
                debug!("loaded encryption key");
                Ok(key)
            }
            None => self.generate(),
        }
    }

    fn generate(&self) -> Result<EncryptionKey, KeyError> {
        if self.storage.exists(CREDENTIALS_FILE)? {
            warn!(
                "encryption key is missing but a credential file exists; \
                 previously stored credentials can no longer be decrypted"
            );
        }

        let key = EncryptionKey::generate()?;
        self.storage.put(KEY_FILE, key.as_bytes())?;
        info!("generated new encryption key");
        Ok(key)
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore").finish_non_exhaustive()
    }
}
