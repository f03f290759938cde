//! Cryptographic primitives for `namaste-cloud`.
//!
//! Provides AES-256-CFB stream encryption of opaque payloads and a
//! zeroize-on-drop key newtype. All key material is cleared from memory when
//! dropped.
//!
//! # Security model
//!
//! - Every encryption draws a fresh 128-bit IV from `OsRng`.
//! - Blob format: `iv (16 bytes) || ciphertext`, where the ciphertext is
//!   exactly as long as the plaintext.
//! - CFB carries no authentication tag. Decrypting with the wrong key, or a
//!   corrupted blob, yields garbage rather than an error; the caller's decode
//!   step is the only detection.

use std::fmt;

use aes::Aes256;
use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Key length for AES-256 (256 bits).
pub const KEY_LEN: usize = 32;

/// IV length for AES-CFB (one AES block).
pub const IV_LEN: usize = 16;

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// A 256-bit encryption key that is zeroized on drop.
///
/// The inner bytes are never exposed in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Create a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a new random key using the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Random`] if the OS generator fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_LEN];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Borrow the raw key bytes.
    ///
    /// The caller must not log these bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Encrypt plaintext using AES-256-CFB with a fresh random IV.
///
/// Returns `iv (16 bytes) || ciphertext`.
///
/// # Errors
///
/// Returns [`CryptoError::Random`] if no IV could be generated.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    fill_random(&mut iv)?;

    let mut blob = Vec::with_capacity(IV_LEN.saturating_add(plaintext.len()));
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(plaintext);

    let (_, body) = blob.split_at_mut(IV_LEN);
    Aes256CfbEnc::new(key.as_bytes().into(), (&iv).into()).encrypt(body);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`CryptoError::CiphertextTooShort`] if the blob is shorter than
/// the 16-byte IV. Any longer blob decrypts; a wrong key produces garbage.
pub fn decrypt(key: &EncryptionKey, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let too_short = || CryptoError::CiphertextTooShort {
        expected: IV_LEN,
        actual: blob.len(),
    };
    if blob.len() < IV_LEN {
        return Err(too_short());
    }

    let (iv, ciphertext) = blob.split_at(IV_LEN);
    let iv: &[u8; IV_LEN] = iv.try_into().map_err(|_| too_short())?;

    let mut plaintext = ciphertext.to_vec();
    Aes256CfbDec::new(key.as_bytes().into(), iv.into()).decrypt(&mut plaintext);
    Ok(plaintext)
}

fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng.try_fill_bytes(buf).map_err(|e| CryptoError::Random {
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = EncryptionKey::generate().unwrap();
        let plaintext = br#"{"aws":{"cloud":"aws","access_key":"AKIA","secret_key":"xyz"}}"#;
        let blob = encrypt(&key, plaintext).unwrap();
        let decrypted = decrypt(&key, &blob).unwrap();
        assert_eq!(plaintext.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn roundtrip_across_partial_blocks() {
        let key = EncryptionKey::generate().unwrap();
        for len in [1usize, 15, 16, 17, 31, 33, 100] {
            let plaintext: Vec<u8> = (0..len).map(|i| u8::try_from(i % 251).unwrap()).collect();
            let blob = encrypt(&key, &plaintext).unwrap();
            assert_eq!(decrypt(&key, &blob).unwrap(), plaintext, "length {len}");
        }
    }

    #[test]
    fn blob_is_iv_plus_plaintext_length() {
        let key = EncryptionKey::generate().unwrap();
        let blob = encrypt(&key, b"twelve bytes").unwrap();
        assert_eq!(blob.len(), IV_LEN + 12);
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        let key = EncryptionKey::generate().unwrap();
        let plaintext = b"plaintext must not appear verbatim";
        let blob = encrypt(&key, plaintext).unwrap();
        assert_ne!(&blob[IV_LEN..], plaintext.as_slice());
    }

    #[test]
    fn two_encryptions_produce_different_blobs() {
        let key = EncryptionKey::generate().unwrap();
        let plaintext = b"same data";
        let b1 = encrypt(&key, plaintext).unwrap();
        let b2 = encrypt(&key, plaintext).unwrap();
        // Different IVs -> different IV prefix and different ciphertext.
        assert_ne!(b1[..IV_LEN], b2[..IV_LEN]);
        assert_ne!(b1, b2);
    }

    #[test]
    fn decrypt_too_short_fails() {
        let key = EncryptionKey::generate().unwrap();
        for len in 0..IV_LEN {
            let result = decrypt(&key, &vec![0u8; len]);
            assert!(matches!(
                result,
                Err(CryptoError::CiphertextTooShort { expected: 16, actual }) if actual == len
            ));
        }
    }

    #[test]
    fn decrypt_bare_iv_yields_empty_plaintext() {
        let key = EncryptionKey::generate().unwrap();
        let decrypted = decrypt(&key, &[0u8; IV_LEN]).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn decrypt_wrong_key_yields_garbage() {
        let key1 = EncryptionKey::generate().unwrap();
        let key2 = EncryptionKey::generate().unwrap();
        let plaintext = b"{\"secret\":\"value\"}";
        let blob = encrypt(&key1, plaintext).unwrap();
        let garbage = decrypt(&key2, &blob).unwrap();
        assert_eq!(garbage.len(), plaintext.len());
        assert_ne!(garbage.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn generated_keys_differ() {
        let k1 = EncryptionKey::generate().unwrap();
        let k2 = EncryptionKey::generate().unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn encryption_key_debug_redacts_bytes() {
        let key = EncryptionKey::from_bytes([0xAB; KEY_LEN]);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("171"));
    }
}
