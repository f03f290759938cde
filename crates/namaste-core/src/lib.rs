//! Core library for `namaste-cloud`.
//!
//! Contains the credential vault: the key store, the AES-256-CFB cipher
//! codec, the encrypted credential store, and the plaintext active-provider
//! config. This crate depends on `namaste-storage` for the storage backend
//! trait and knows nothing about cloud SDKs or the command line.

pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod keystore;
pub mod paths;
pub mod provider;
pub mod vault;

pub use config::{Config, ConfigStore};
pub use credentials::{Credential, CredentialMap, CredentialStore};
pub use error::ErrorKind;
pub use paths::VaultPaths;
pub use provider::Provider;
pub use vault::Vault;
