//! The vault handle passed to command handlers.
//!
//! Bundles the credential store and the active-provider config over one
//! storage backend. Handlers receive a `&Vault` explicitly; there is no
//! process-wide state.

use std::sync::Arc;

use namaste_storage::{FileBackend, StorageBackend};

use crate::config::ConfigStore;
use crate::credentials::CredentialStore;
use crate::paths::VaultPaths;

/// Credential store and config sharing one storage backend.
#[derive(Debug)]
pub struct Vault {
    credentials: CredentialStore,
    config: ConfigStore,
}

impl Vault {
    /// Open the vault stored in `paths`. Nothing is created on disk until the
    /// first write.
    #[must_use]
    pub fn open(paths: &VaultPaths) -> Self {
        Self::with_backend(Arc::new(FileBackend::new(paths.dir())))
    }

    /// Build a vault over an arbitrary backend.
    #[must_use]
    pub fn with_backend(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            credentials: CredentialStore::new(Arc::clone(&storage)),
            config: ConfigStore::new(storage),
        }
    }

    /// The encrypted credential store.
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The active-provider config store.
    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credentials::Credential;
    use crate::error::{CredentialError, ErrorKind};
    use crate::provider::Provider;

    #[test]
    fn end_to_end_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = VaultPaths::new(tmp.path().join(".namaste-cloud"));
        let vault = Vault::open(&paths);

        let saved = Credential::new(Provider::Aws, "AKIAEXAMPLE", "xyz").unwrap();
        vault.credentials().save(saved.clone()).unwrap();
        vault.config().set_active(Provider::Aws).unwrap();

        // A fresh handle sees the same on-disk state.
        let vault = Vault::open(&paths);
        let active = vault.config().load_active_provider().unwrap();
        assert_eq!(active, Provider::Aws);
        assert_eq!(vault.credentials().get(active).unwrap(), saved);

        let err = vault.credentials().get(Provider::Gcp).unwrap_err();
        assert!(matches!(err, CredentialError::NotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(paths.key_file().is_file());
        assert!(paths.credentials_file().is_file());
        assert!(paths.config_file().is_file());
    }

    #[test]
    fn open_does_not_create_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = VaultPaths::new(tmp.path().join("never-written"));
        let vault = Vault::open(&paths);

        assert!(vault.credentials().get(Provider::Aws).is_err());
        assert!(vault.config().load().is_ok());
        assert!(!paths.dir().exists());
    }

    #[test]
    fn key_file_is_raw_32_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = VaultPaths::new(tmp.path());
        let vault = Vault::open(&paths);
        vault
            .credentials()
            .save(Credential::new(Provider::Gcp, "id", "secret").unwrap())
            .unwrap();

        assert_eq!(std::fs::read(paths.key_file()).unwrap().len(), 32);
    }

    #[test]
    fn deleting_key_file_invalidates_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = VaultPaths::new(tmp.path());
        let vault = Vault::open(&paths);
        vault
            .credentials()
            .save(Credential::new(Provider::Aws, "AKIA", "xyz").unwrap())
            .unwrap();

        std::fs::remove_file(paths.key_file()).unwrap();
        let err = vault.credentials().load_all().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
