// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # ORGiD DIDs
//!
//! An ORGiD DID has the form `did:orgid:<chainId>:0x<orgId>`, where `orgId`
//! is the registry id `keccak256(owner || salt)`. The DID document (ORG.JSON)
//! lives off-chain inside a signed ORGiD VC whose URI is stored in the
//! registry.

pub mod document;
pub mod parse;
pub mod resolver;

pub use document::{
    DidDocument, DidResolutionResponse, MethodRef, OrgIdVc, Proof, VerificationMethod,
};
pub use parse::{parse_blockchain_account_id, parse_did, BlockchainAccountId, ParsedDid};
pub use resolver::{DidResolver, OrgIdResolver};

/// Errors from DID parsing and document handling.
#[derive(Debug, thiserror::Error)]
pub enum DidError {
    #[error("Invalid DID: \"{0}\"")]
    InvalidDid(String),

    #[error("Invalid blockchainAccountId: \"{0}\"")]
    InvalidAccountId(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}
