// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the ORGiD registry.
//!
//! This module provides functionality for:
//! - Reading ORGiD records from the registry
//! - Encoding registry calls (create, update, delegates, transfer)
//! - Transaction signing and broadcasting

pub mod client;
pub mod registry;
pub mod transactions;
pub mod types;

pub use client::{ChainClientError, HttpProvider, OrgIdClient};
pub use registry::org_id_from_salt;
pub use transactions::{parse_gwei, TxBuilder};
pub use types::*;
