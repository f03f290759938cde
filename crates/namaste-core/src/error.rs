//! Error types for `namaste-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. No variant ever includes key material or secret values, only
//! file names, provider identifiers, lengths, and operation descriptions.
//!
//! Every error exposes [`kind`](CredentialError::kind), mapping it onto the
//! small [`ErrorKind`] taxonomy that callers branch on.

use namaste_storage::StorageError;

/// Coarse classification shared by all vault errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Directory or file creation, read, or write failed.
    Io,
    /// Stored data has the wrong shape: key file size, short ciphertext, or
    /// undecodable plaintext.
    Format,
    /// The requested credential or selection does not exist.
    NotFound,
    /// The caller supplied an unsupported provider or an invalid value.
    Configuration,
}

/// Errors from cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The blob is too short to contain the initialization vector.
    #[error("ciphertext too short: expected at least {expected} bytes, got {actual}")]
    CiphertextTooShort { expected: usize, actual: usize },

    /// The OS random number generator failed.
    #[error("random number generation failed: {reason}")]
    Random { reason: String },
}

impl CryptoError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CiphertextTooShort { .. } => ErrorKind::Format,
            Self::Random { .. } => ErrorKind::Io,
        }
    }
}

/// Errors from the key store.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The key file exists but does not hold exactly one key.
    #[error("invalid encryption key size: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Generating a fresh key failed.
    #[error("failed to generate encryption key: {0}")]
    Generate(#[from] CryptoError),

    /// The storage backend failed while reading or persisting the key.
    #[error("key storage error: {0}")]
    Storage(#[from] StorageError),
}

impl KeyError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLength { .. } => ErrorKind::Format,
            Self::Generate(e) => e.kind(),
            Self::Storage(_) => ErrorKind::Io,
        }
    }
}

/// Errors from provider identifier parsing.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The identifier does not name a supported provider.
    #[error("unsupported cloud provider '{name}' (choose from aws, gcp, or azure)")]
    Unsupported { name: String },
}

impl ProviderError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

/// Errors from the credential store.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// No credential file exists yet.
    #[error("no credentials configured. Use `namaste-cloud configure` to add them")]
    NotConfigured,

    /// The credential map has no entry for the provider.
    #[error("no credentials found for cloud: {provider}. Use `namaste-cloud configure` to set them")]
    NotFound { provider: String },

    /// A credential field failed validation.
    #[error("invalid credential: {reason}")]
    Invalid { reason: String },

    /// The decrypted credential file could not be decoded.
    #[error("failed to deserialize credentials ({reason}); the key file may not match the credential file")]
    Decode { reason: String },

    /// The credential map could not be serialized.
    #[error("failed to serialize credentials: {reason}")]
    Serialization { reason: String },

    /// A stored entry names an unsupported provider.
    #[error("credential file entry: {0}")]
    Provider(#[from] ProviderError),

    /// Loading or creating the encryption key failed.
    #[error("encryption key error: {0}")]
    Key(#[from] KeyError),

    /// Encrypting or decrypting the credential file failed.
    #[error("credential crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The storage backend failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CredentialError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured | Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Invalid { .. } => ErrorKind::Configuration,
            Self::Decode { .. } | Self::Provider(_) => ErrorKind::Format,
            Self::Serialization { .. } | Self::Storage(_) => ErrorKind::Io,
            Self::Key(e) => e.kind(),
            Self::Crypto(e) => e.kind(),
        }
    }
}

/// Errors from the active-provider config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config holds an empty selector.
    #[error("no active cloud provider set. Please use `namaste-cloud use-cloud` to select one")]
    NoActiveProvider,

    /// The config file could not be decoded.
    #[error("failed to read config: {reason}")]
    Decode { reason: String },

    /// The config could not be serialized.
    #[error("failed to write config: {reason}")]
    Serialization { reason: String },

    /// The selector names an unsupported provider.
    #[error("active cloud provider: {0}")]
    Provider(#[from] ProviderError),

    /// The storage backend failed.
    #[error("config storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ConfigError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoActiveProvider => ErrorKind::NotFound,
            Self::Decode { .. } => ErrorKind::Format,
            Self::Provider(e) => e.kind(),
            Self::Serialization { .. } | Self::Storage(_) => ErrorKind::Io,
        }
    }
}

/// Errors from resolving the vault directory.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Neither an explicit directory nor a home directory is available.
    #[error("failed to determine the user home directory")]
    NoHomeDir,
}

impl PathError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Io
    }
}
