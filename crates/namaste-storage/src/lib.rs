//! Storage backend abstraction for `namaste-cloud`.
//!
//! This crate defines the [`StorageBackend`] trait, a pure key-value storage
//! interface that knows nothing about credentials, keys, or encryption. The
//! vault in `namaste-core` decides what is encrypted before it reaches this
//! layer.
//!
//! Two implementations are provided:
//!
//! - [`FileBackend`]: one file per key inside the per-user config directory
//! - [`MemoryBackend`]: in-memory, for testing only

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileBackend;
pub use memory::MemoryBackend;

/// A pluggable key-value storage backend.
///
/// Keys are short names (`config.json`, `credentials.enc`, `keyfile`).
/// Values are opaque byte arrays and are always replaced as a whole; there
/// is no partial update and no removal.
///
/// Implementations must be safe to share between owners (`Send + Sync`).
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a value, replacing any existing value for the key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a cheaper check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}
