// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! secp256k1 keys imported from PEM files and stored as JWK.

use alloy::primitives::{Address, Signature, B256};
use k256::{
    ecdsa::{signature::Signer, SigningKey},
    elliptic_curve::sec1::ToEncodedPoint,
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    PublicKey, SecretKey,
};

use super::{address_from_public_key, KeyError};
use crate::storage::Jwk;

/// A PEM-imported key pair.
#[derive(Clone)]
pub struct PemKey {
    secret: SecretKey,
    address: Address,
}

impl std::fmt::Debug for PemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PemKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl PemKey {
    fn from_secret(secret: SecretKey) -> Result<Self, KeyError> {
        let point = secret.public_key().to_encoded_point(false);
        let address = address_from_public_key(point.as_bytes())?;
        Ok(Self { secret, address })
    }

    /// Parse a private key PEM (SEC1 `EC PRIVATE KEY` or PKCS#8 `PRIVATE KEY`).
    pub fn from_private_pem(private_pem: &str) -> Result<Self, KeyError> {
        let pem = ::pem::parse(private_pem)
            .map_err(|e| KeyError::InvalidPem(format!("Invalid private key PEM: {e}")))?;

        let secret = SecretKey::from_sec1_der(pem.contents())
            .or_else(|_| SecretKey::from_pkcs8_der(pem.contents()))
            .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid key format: {e}")))?;

        Self::from_secret(secret)
    }

    /// Parse a public/private PEM pair and check that they belong together.
    pub fn from_pem_pair(public_pem: &str, private_pem: &str) -> Result<Self, KeyError> {
        let key = Self::from_private_pem(private_pem)?;

        let pem = ::pem::parse(public_pem)
            .map_err(|e| KeyError::InvalidPem(format!("Invalid public key PEM: {e}")))?;
        let public = PublicKey::from_public_key_der(pem.contents())
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;

        if public != key.secret.public_key() {
            return Err(KeyError::InvalidPublicKey(
                "public key does not match the private key".to_string(),
            ));
        }

        Ok(key)
    }

    /// Restore a key from its private JWK (as stored, after decryption).
    pub fn from_private_jwk(jwk_json: &str) -> Result<Self, KeyError> {
        let secret = SecretKey::from_jwk_str(jwk_json)
            .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid private JWK: {e}")))?;
        Self::from_secret(secret)
    }

    /// Private JWK serialized as JSON. Must be encrypted before it is stored.
    pub fn private_jwk_json(&self) -> String {
        self.secret.to_jwk_string().to_string()
    }

    pub fn public_jwk(&self) -> Result<Jwk, KeyError> {
        serde_json::from_str(&self.secret.public_key().to_jwk_string())
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Recoverable ECDSA signature over a 32-byte digest.
    pub fn sign_digest(&self, digest: &B256) -> Result<Signature, KeyError> {
        let signing_key = SigningKey::from(&self.secret);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        Ok(Signature::from_signature_and_parity(
            signature,
            recovery_id.is_y_odd(),
        ))
    }

    /// `ES256K` JWS signature: SHA-256 over `message`, 64-byte `r || s`.
    pub fn sign_es256k(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signing_key = SigningKey::from(&self.secret);
        let signature: k256::ecdsa::Signature = signing_key
            .try_sign(message)
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }
}
