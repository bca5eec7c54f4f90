// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Passphrase-based encryption of stored secrets.
//!
//! ## Format
//!
//! ```text
//! base64( salt[16] || nonce[12] || AES-256-GCM ciphertext+tag )
//! ```
//!
//! The AES key is derived from the passphrase with Argon2id (default
//! parameters) over the per-secret random salt. A wrong passphrase, a
//! modified ciphertext and a malformed string all fail the GCM tag check
//! or the framing check and surface as [`SecretError::Decryption`].

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::Argon2;
use base64ct::{Base64, Encoding};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Minimum passphrase length accepted for new secrets.
pub const MIN_PASSPHRASE_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Wrong passphrase or corrupted ciphertext
    #[error("Unable to decrypt the secret: wrong password or corrupted data")]
    Decryption,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error(
        "Password must be at least {MIN_PASSPHRASE_LEN} characters long and contain letters and digits"
    )]
    WeakPassphrase,
}

/// Encrypt `plaintext` under `passphrase`.
pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String, SecretError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let cipher = cipher_for(passphrase, &salt).map_err(SecretError::Encryption)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| SecretError::Encryption(e.to_string()))?;

    let mut framed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    framed.extend_from_slice(&salt);
    framed.extend_from_slice(&nonce);
    framed.extend_from_slice(&ciphertext);

    Ok(Base64::encode_string(&framed))
}

/// Decrypt a string produced by [`encrypt`].
pub fn decrypt(encoded: &str, passphrase: &str) -> Result<String, SecretError> {
    let framed = Base64::decode_vec(encoded.trim()).map_err(|_| SecretError::Decryption)?;
    if framed.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
        return Err(SecretError::Decryption);
    }

    let (salt, rest) = framed.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| SecretError::Decryption)?;

    let cipher = cipher_for(passphrase, salt).map_err(|_| SecretError::Decryption)?;
    let plaintext = cipher
        .decrypt(&Nonce::from(nonce), ciphertext)
        .map_err(|_| SecretError::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| SecretError::Decryption)
}

/// Check a passphrase chosen for a new secret.
pub fn validate_passphrase(passphrase: &str) -> Result<(), SecretError> {
    let long_enough = passphrase.chars().count() >= MIN_PASSPHRASE_LEN;
    let has_letter = passphrase.chars().any(|c| c.is_alphabetic());
    let has_digit = passphrase.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err(SecretError::WeakPassphrase)
    }
}

fn cipher_for(passphrase: &str, salt: &[u8]) -> Result<Aes256Gcm, String> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| format!("Key derivation failed: {e}"))?;
    Ok(Aes256Gcm::new(&Key::<Aes256Gcm>::from(key)))
}
