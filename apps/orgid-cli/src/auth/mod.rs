// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Auth Tokens
//!
//! ORGiD auth tokens are JWTs whose issuer is a DID URL pointing at a
//! verification method of the issuing organization:
//!
//! 1. The issuer DID is resolved and the method `iss` is looked up
//! 2. A local key matching the method is unlocked
//! 3. The token is signed `ES256K-R` (account methods) or `ES256K` (JWK methods)
//!
//! The same signers produce the detached JWS proofs of ORGiD VCs.

pub mod claims;
pub mod token;

pub use claims::{parse_scope, AuthClaims, DEFAULT_LIFETIME};
pub use token::{create_auth_jwt, sign_detached, JwsAlgorithm};
