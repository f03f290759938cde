//! Storage error types.
//!
//! Every error variant carries the key or path involved and the underlying
//! reason, so a failure can be diagnosed from the message alone.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to create the storage directory.
    #[error("failed to create directory '{path}': {reason}")]
    CreateDir { path: String, reason: String },

    /// Failed to read a value from storage.
    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    /// The key cannot be mapped onto the backend (e.g. contains a path separator).
    #[error("invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}
