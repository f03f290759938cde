//! Encrypted credential store.
//!
//! All credentials live in one file: the full provider → credential map is
//! serialized to JSON, encrypted with the vault key, and written as a whole.
//! Every read and every write re-processes the entire map; there are no
//! partial updates.
//!
//! On disk the decrypted JSON looks like
//! `{"aws":{"cloud":"aws","access_key":"…","secret_key":"…"}}`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use namaste_storage::StorageBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto;
use crate::error::CredentialError;
use crate::keystore::KeyStore;
use crate::paths::CREDENTIALS_FILE;
use crate::provider::Provider;

/// Access/secret key pair for one provider.
///
/// Key material is zeroized on drop and the secret is redacted in `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    cloud: Provider,
    access_key: String,
    secret_key: String,
}

impl Credential {
    /// Build a credential, trimming surrounding whitespace from both keys.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Invalid`] if either key is empty after
    /// trimming.
    pub fn new(
        cloud: Provider,
        access_key: impl AsRef<str>,
        secret_key: impl AsRef<str>,
    ) -> Result<Self, CredentialError> {
        let access_key = access_key.as_ref().trim();
        let secret_key = secret_key.as_ref().trim();
        if access_key.is_empty() || secret_key.is_empty() {
            return Err(CredentialError::Invalid {
                reason: "access key and secret key cannot be empty".to_owned(),
            });
        }
        Ok(Self {
            cloud,
            access_key: access_key.to_owned(),
            secret_key: secret_key.to_owned(),
        })
    }

    /// The provider this credential belongs to.
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.cloud
    }

    /// The access key (AWS access key id, GCP service account id, Azure
    /// client id).
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret half of the pair. Never log it.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("cloud", &self.cloud)
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// All stored credentials, at most one per provider.
pub type CredentialMap = BTreeMap<Provider, Credential>;

/// Reads and writes the encrypted credential file.
pub struct CredentialStore {
    storage: Arc<dyn StorageBackend>,
    keys: KeyStore,
}

impl CredentialStore {
    /// Create a credential store over `storage`. The vault key is read from
    /// the same backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            keys: KeyStore::new(Arc::clone(&storage)),
            storage,
        }
    }

    /// Insert or replace the credential for its provider.
    ///
    /// A missing credential file starts an empty map; any other load failure
    /// aborts the save so an unreadable file is never overwritten.
    ///
    /// # Errors
    ///
    /// Propagates load, key, encryption, and storage failures.
    pub fn save(&self, credential: Credential) -> Result<(), CredentialError> {
        let mut creds = match self.load_all() {
            Ok(creds) => creds,
            Err(CredentialError::NotConfigured) => CredentialMap::new(),
            Err(e) => return Err(e),
        };

        let provider = credential.provider();
        creds.insert(provider, credential);
        self.write_all(&creds)?;

        debug!(%provider, entries = creds.len(), "saved credential");
        Ok(())
    }

    /// Decrypt and decode every stored credential.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::NotConfigured`] if no credential file exists.
    /// - [`CredentialError::Crypto`] if the file is shorter than an IV.
    /// - [`CredentialError::Decode`] if the decrypted bytes are not a
    ///   credential map (typically a key file that does not match).
    /// - [`CredentialError::Key`] / [`CredentialError::Storage`] on I/O failure.
    pub fn load_all(&self) -> Result<CredentialMap, CredentialError> {
        let blob = self
            .storage
            .get(CREDENTIALS_FILE)?
            .ok_or(CredentialError::NotConfigured)?;

        let key = self.keys.load_or_create()?;
        let mut plaintext = crypto::decrypt(&key, &blob)?;
        let decoded = decode_map(&plaintext);
        plaintext.zeroize();

        let creds = decoded?;
        debug!(entries = creds.len(), "loaded credentials");
        Ok(creds)
    }

    /// Look up the credential for one provider.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if the provider has no entry, and
    /// every error of [`load_all`](Self::load_all).
    pub fn get(&self, provider: Provider) -> Result<Credential, CredentialError> {
        let mut creds = self.load_all()?;
        creds.remove(&provider).ok_or_else(|| CredentialError::NotFound {
            provider: provider.to_string(),
        })
    }

    /// Whether a credential file exists at all.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Storage`] if existence cannot be checked.
    pub fn is_configured(&self) -> Result<bool, CredentialError> {
        Ok(self.storage.exists(CREDENTIALS_FILE)?)
    }

    /// Providers with a stored credential, sorted. Empty when nothing has
    /// been configured yet.
    ///
    /// # Errors
    ///
    /// Every error of [`load_all`](Self::load_all) except `NotConfigured`.
    pub fn providers(&self) -> Result<Vec<Provider>, CredentialError> {
        match self.load_all() {
            Ok(creds) => Ok(creds.keys().copied().collect()),
            Err(CredentialError::NotConfigured) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, creds: &CredentialMap) -> Result<(), CredentialError> {
        let by_id: BTreeMap<&str, &Credential> =
            creds.iter().map(|(p, c)| (p.as_str(), c)).collect();
        let mut plaintext =
            serde_json::to_vec(&by_id).map_err(|e| CredentialError::Serialization {
                reason: e.to_string(),
            })?;

        let encrypted = match self.keys.load_or_create() {
            Ok(key) => crypto::encrypt(&key, &plaintext).map_err(CredentialError::from),
            Err(e) => Err(e.into()),
        };
        plaintext.zeroize();

        self.storage.put(CREDENTIALS_FILE, &encrypted?)?;
        Ok(())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

fn decode_map(plaintext: &[u8]) -> Result<CredentialMap, CredentialError> {
    let by_id: BTreeMap<String, Credential> =
        serde_json::from_slice(plaintext).map_err(|e| CredentialError::Decode {
            reason: e.to_string(),
        })?;

    let invalid = |reason: String| CredentialError::Decode { reason };
    let mut creds = CredentialMap::new();
    for (id, cred) in by_id {
        let provider: Provider = id.parse()?;

        if cred.cloud != provider {
            return Err(invalid(format!(
                "entry '{id}' holds a credential for '{}'",
                cred.cloud
            )));
        }
        if cred.access_key.trim().is_empty() || cred.secret_key.trim().is_empty() {
            return Err(invalid(format!("entry '{id}' has an empty key field")));
        }
        if creds.insert(provider, cred).is_some() {
            return Err(invalid(format!("more than one entry for provider '{provider}'")));
        }
    }
    Ok(creds)
}
