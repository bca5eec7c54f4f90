// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Pairs
//!
//! A registered key is one of four kinds, all exposing an address and
//! (except multisig) a digest signer:
//!
//! | Kind          | Private material (encrypted at rest) | Signs with        |
//! |---------------|--------------------------------------|-------------------|
//! | `ethereum`    | hex private key                      | local secp256k1   |
//! | `pem`         | private JWK                          | local secp256k1   |
//! | `kmsEthereum` | [`kms::AwsKmsConfig`] JSON           | AWS KMS           |
//! | `multisig`    | none                                 | Safe proposals    |

pub mod kms;
pub mod pem;

use std::str::FromStr;

use alloy::{
    primitives::{eip191_hash_message, keccak256, Address, Signature, B256},
    signers::{local::PrivateKeySigner, SignerSync},
};

use crate::crypto::{self, SecretError};
use crate::safe::SafeAddress;
use crate::storage::{KeyRecord, KeyType};

pub use kms::{AwsKms, AwsKmsConfig, KmsBackend, KmsSigner};
pub use self::pem::PemKey;

/// Errors that can occur while loading keys or signing.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid PEM: {0}")]
    InvalidPem(String),

    #[error("Invalid multisig reference: {0}")]
    InvalidMultisig(String),

    #[error("Remote signing failed: {0}")]
    RemoteSigning(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Key pair of type \"{0}\" cannot sign")]
    CannotSign(KeyType),

    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Derive an Ethereum address from an uncompressed SEC1 point (`0x04 || X || Y`).
pub fn address_from_public_key(uncompressed: &[u8]) -> Result<Address, KeyError> {
    if uncompressed.len() != 65 || uncompressed[0] != 0x04 {
        return Err(KeyError::InvalidPublicKey(
            "expected an uncompressed secp256k1 point".to_string(),
        ));
    }

    // keccak256 of X || Y, last 20 bytes
    let hash = keccak256(&uncompressed[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Parse a hex private key (with or without `0x`).
pub fn parse_private_key(private_key_hex: &str) -> Result<PrivateKeySigner, KeyError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))
}

fn decrypt_private_key(record: &KeyRecord, passphrase: &str) -> Result<String, KeyError> {
    let encrypted = record.private_key.as_deref().ok_or_else(|| {
        KeyError::InvalidPrivateKey(format!("no private key stored for \"{}\"", record.tag))
    })?;
    Ok(crypto::decrypt(encrypted, passphrase)?)
}

/// An unlocked key pair, live for one invocation.
#[derive(Debug)]
pub enum KeyPair {
    Ethereum(PrivateKeySigner),
    Pem(PemKey),
    KmsEthereum(KmsSigner<AwsKms>),
    Multisig(SafeAddress),
}

impl KeyPair {
    /// Decrypt the record's private material and build the signer.
    ///
    /// `passphrase` is ignored for multisig records.
    pub async fn unlock(record: &KeyRecord, passphrase: &str) -> Result<Self, KeyError> {
        match record.key_type {
            KeyType::Multisig => {
                let reference = record.multisig.as_deref().ok_or_else(|| {
                    KeyError::InvalidMultisig(format!("missing for \"{}\"", record.tag))
                })?;
                let safe = SafeAddress::from_str(reference)
                    .map_err(|e| KeyError::InvalidMultisig(e.to_string()))?;
                Ok(KeyPair::Multisig(safe))
            }
            KeyType::Ethereum => {
                let secret = decrypt_private_key(record, passphrase)?;
                Ok(KeyPair::Ethereum(parse_private_key(&secret)?))
            }
            KeyType::Pem => {
                let secret = decrypt_private_key(record, passphrase)?;
                Ok(KeyPair::Pem(PemKey::from_private_jwk(&secret)?))
            }
            KeyType::KmsEthereum => {
                let secret = decrypt_private_key(record, passphrase)?;
                let config: AwsKmsConfig = serde_json::from_str(&secret)
                    .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid KMS config: {e}")))?;
                let backend = AwsKms::new(&config).await;
                Ok(KeyPair::KmsEthereum(KmsSigner::connect(backend).await?))
            }
        }
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            KeyPair::Ethereum(_) => KeyType::Ethereum,
            KeyPair::Pem(_) => KeyType::Pem,
            KeyPair::KmsEthereum(_) => KeyType::KmsEthereum,
            KeyPair::Multisig(_) => KeyType::Multisig,
        }
    }

    /// Signer address, or the Safe address for multisig.
    pub fn address(&self) -> Address {
        match self {
            KeyPair::Ethereum(signer) => signer.address(),
            KeyPair::Pem(key) => key.address(),
            KeyPair::KmsEthereum(signer) => signer.address(),
            KeyPair::Multisig(safe) => safe.address,
        }
    }

    /// Recoverable signature over a 32-byte digest.
    pub async fn sign_digest(&self, digest: &B256) -> Result<Signature, KeyError> {
        match self {
            KeyPair::Ethereum(signer) => signer
                .sign_hash_sync(digest)
                .map_err(|e| KeyError::Signing(e.to_string())),
            KeyPair::Pem(key) => key.sign_digest(digest),
            KeyPair::KmsEthereum(signer) => signer.sign_digest(digest).await,
            KeyPair::Multisig(_) => Err(KeyError::CannotSign(KeyType::Multisig)),
        }
    }

    /// EIP-191 personal message signature.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, KeyError> {
        self.sign_digest(&eip191_hash_message(message)).await
    }
}
