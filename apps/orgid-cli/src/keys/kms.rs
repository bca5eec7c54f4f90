// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ethereum signer backed by an AWS KMS `ECC_SECG_P256K1` key.
//!
//! KMS returns plain DER `(r, s)` signatures with no recovery id and no low-S
//! guarantee. [`KmsSigner::sign_digest`] normalizes `s` and picks the parity
//! that recovers the key's address.

use alloy::primitives::{uint, Address, Signature, B256, U256};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_kms::{
    error::DisplayErrorContext,
    primitives::Blob,
    types::{MessageType, SigningAlgorithmSpec},
    Client,
};
use k256::{elliptic_curve::sec1::ToEncodedPoint, pkcs8::DecodePublicKey, PublicKey};
use serde::{Deserialize, Serialize};

use super::{address_from_public_key, KeyError};

/// secp256k1 group order.
pub const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// `SECP256K1_N / 2`.
pub const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// KMS key settings, stored encrypted in the key record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsKmsConfig {
    pub key_id: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

/// Remote key operations a [`KmsSigner`] needs.
#[allow(async_fn_in_trait)]
pub trait KmsBackend {
    /// DER-encoded SubjectPublicKeyInfo of the key.
    async fn public_key(&self) -> Result<Vec<u8>, KeyError>;

    /// DER-encoded ECDSA signature over a precomputed 32-byte digest.
    async fn sign(&self, digest: &B256) -> Result<Vec<u8>, KeyError>;
}

/// AWS KMS client bound to one key.
#[derive(Debug, Clone)]
pub struct AwsKms {
    client: Client,
    key_id: String,
}

impl AwsKms {
    /// Build a client from stored settings.
    ///
    /// Explicit credentials take precedence; otherwise the default AWS
    /// credential chain is used.
    pub async fn new(config: &AwsKmsConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None, // session token
                None, // expiration
                "orgid-project",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
            key_id: config.key_id.clone(),
        }
    }
}

impl KmsBackend for AwsKms {
    async fn public_key(&self) -> Result<Vec<u8>, KeyError> {
        let response = self
            .client
            .get_public_key()
            .key_id(&self.key_id)
            .send()
            .await
            .map_err(|e| KeyError::RemoteSigning(DisplayErrorContext(&e).to_string()))?;

        response
            .public_key
            .map(Blob::into_inner)
            .ok_or_else(|| KeyError::RemoteSigning("KMS returned no public key".to_string()))
    }

    async fn sign(&self, digest: &B256) -> Result<Vec<u8>, KeyError> {
        let response = self
            .client
            .sign()
            .key_id(&self.key_id)
            .message(Blob::new(digest.as_slice()))
            .message_type(MessageType::Digest)
            .signing_algorithm(SigningAlgorithmSpec::EcdsaSha256)
            .send()
            .await
            .map_err(|e| KeyError::RemoteSigning(DisplayErrorContext(&e).to_string()))?;

        response
            .signature
            .map(Blob::into_inner)
            .ok_or_else(|| KeyError::RemoteSigning("KMS returned no signature".to_string()))
    }
}

/// Signer over a KMS key. The public key and address are fetched once, at
/// construction.
#[derive(Debug)]
pub struct KmsSigner<B> {
    backend: B,
    address: Address,
}

impl<B: KmsBackend> KmsSigner<B> {
    pub async fn connect(backend: B) -> Result<Self, KeyError> {
        let der = backend.public_key().await?;
        let public_key = PublicKey::from_public_key_der(&der).map_err(|e| {
            KeyError::RemoteSigning(format!("KMS returned an unusable public key: {e}"))
        })?;
        let address = address_from_public_key(public_key.to_encoded_point(false).as_bytes())?;

        tracing::debug!(%address, "Connected to KMS key");

        Ok(Self { backend, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn sign_digest(&self, digest: &B256) -> Result<Signature, KeyError> {
        let der = self.backend.sign(digest).await?;
        let signature = k256::ecdsa::Signature::from_der(&der).map_err(|e| {
            KeyError::RemoteSigning(format!("KMS returned a malformed signature: {e}"))
        })?;

        let (r, s) = signature.split_bytes();
        let r = U256::from_be_slice(&r);
        let s = canonicalize_s(U256::from_be_slice(&s));

        select_recovery(digest, r, s, self.address)
    }
}

/// Move `s` into the lower half of the curve order.
pub fn canonicalize_s(s: U256) -> U256 {
    if s > SECP256K1_HALF_N {
        SECP256K1_N - s
    } else {
        s
    }
}

/// Pick the parity (v = 27 or 28) whose signature recovers `expected`.
pub fn select_recovery(
    digest: &B256,
    r: U256,
    s: U256,
    expected: Address,
) -> Result<Signature, KeyError> {
    for y_parity in [false, true] {
        let candidate = Signature::new(r, s, y_parity);
        if candidate.recover_address_from_prehash(digest).ok() == Some(expected) {
            return Ok(candidate);
        }
    }

    Err(KeyError::RemoteSigning(format!(
        "KMS signature does not recover to the key address {expected}"
    )))
}
