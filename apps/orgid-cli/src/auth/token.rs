// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compact and detached JWS signing with ORGiD key pairs.
//!
//! Ethereum and KMS keys sign `ES256K-R`: the EIP-191 personal-message hash
//! of the signing input, encoded as 65-byte `r || s || v` with `v` in
//! {27, 28}. PEM keys sign `ES256K`: SHA-256 of the signing input, encoded as
//! 64-byte `r || s`.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Serialize;
use serde_json::json;

use super::claims::AuthClaims;
use crate::keys::{KeyError, KeyPair};

/// JWS algorithms produced by ORGiD key pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwsAlgorithm {
    Es256kR,
    Es256k,
}

impl JwsAlgorithm {
    pub fn for_key(key: &KeyPair) -> Self {
        match key {
            KeyPair::Pem(_) => JwsAlgorithm::Es256k,
            _ => JwsAlgorithm::Es256kR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JwsAlgorithm::Es256kR => "ES256K-R",
            JwsAlgorithm::Es256k => "ES256K",
        }
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, KeyError> {
    let bytes = serde_json::to_vec(value).map_err(|e| KeyError::Signing(e.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

async fn sign_input(key: &KeyPair, input: &[u8]) -> Result<Vec<u8>, KeyError> {
    match key {
        KeyPair::Pem(pem) => pem.sign_es256k(input),
        _ => Ok(key.sign_message(input).await?.as_bytes().to_vec()),
    }
}

/// Sign `claims` as a compact JWT with `kid` set to the issuer.
pub async fn create_auth_jwt(key: &KeyPair, claims: &AuthClaims) -> Result<String, KeyError> {
    let header = json!({
        "alg": JwsAlgorithm::for_key(key).as_str(),
        "typ": "JWT",
        "kid": claims.iss,
    });

    let signing_input = format!("{}.{}", encode_json(&header)?, encode_json(claims)?);
    let signature = sign_input(key, signing_input.as_bytes()).await?;

    Ok(format!(
        "{signing_input}.{}",
        Base64UrlUnpadded::encode_string(&signature)
    ))
}

/// Detached JWS (RFC 7797, `b64: false`) over `payload`: `<header>..<signature>`.
pub async fn sign_detached(key: &KeyPair, payload: &[u8]) -> Result<String, KeyError> {
    let header = json!({
        "alg": JwsAlgorithm::for_key(key).as_str(),
        "b64": false,
        "crit": ["b64"],
    });
    let encoded_header = encode_json(&header)?;

    let mut signing_input = Vec::with_capacity(encoded_header.len() + 1 + payload.len());
    signing_input.extend_from_slice(encoded_header.as_bytes());
    signing_input.push(b'.');
    signing_input.extend_from_slice(payload);

    let signature = sign_input(key, &signing_input).await?;
    Ok(format!(
        "{encoded_header}..{}",
        Base64UrlUnpadded::encode_string(&signature)
    ))
}
