// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ORGiD CLI - organization identity management
//!
//! Creates ORG.JSON documents and ORGiD verifiable credentials, publishes
//! them to IPFS and registers them in the ORGiD registry, signing with local,
//! PEM, AWS KMS or Safe multisig keys.
//!
//! ## Modules
//!
//! - `operations` - One module per `--operation`
//! - `storage` - Project file (keys, ORGiDs, config, deployments)
//! - `keys` - Key pair variants and signing
//! - `blockchain` - ORGiD registry calls and transaction sending
//! - `safe` - Safe multisig proposals
//! - `did` - DID parsing, documents and resolution
//! - `auth` - Auth JWTs and detached JWS

pub mod auth;
pub mod blockchain;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod did;
pub mod error;
pub mod ipfs;
pub mod keys;
pub mod operations;
pub mod prompt;
pub mod safe;
pub mod storage;
