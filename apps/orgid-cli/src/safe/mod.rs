// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Safe Multisig
//!
//! Registry calls owned by a Safe wallet are not broadcast. They are
//! proposed to the Safe transaction service, signed by one owner, and
//! executed later by the Safe owners.
//!
//! Wallets are referenced as `<chainPrefix>:<address>`:
//!
//! | Prefix  | Chain id   | Service name   |
//! |---------|------------|----------------|
//! | `eth`   | 1          | `mainnet`      |
//! | `gor`   | 5          | `goerli`       |
//! | `gno`   | 100        | `gnosis-chain` |
//! | `matic` | 137        | `polygon`      |
//! | `sep`   | 11155111   | `sepolia`      |

pub mod proposal;
pub mod relay;

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;

use crate::keys::KeyError;

pub use proposal::{propose, safe_tx_hash, SafeTx};
pub use relay::{EstimationRequest, ProposalRequest, SafeRelay, SafeTransactionService};

/// Errors from Safe reference parsing and the transaction service.
#[derive(Debug, thiserror::Error)]
pub enum SafeError {
    #[error("Unsupported network \"{0}\"")]
    UnsupportedNetwork(String),

    #[error("Invalid Safe address: {0}")]
    InvalidAddress(String),

    #[error("Safe transaction service error: {0}")]
    Relay(String),

    #[error(transparent)]
    Signing(#[from] KeyError),
}

struct SafeChain {
    prefix: &'static str,
    chain_id: u64,
    name: &'static str,
}

const SAFE_CHAINS: &[SafeChain] = &[
    SafeChain { prefix: "eth", chain_id: 1, name: "mainnet" },
    SafeChain { prefix: "gor", chain_id: 5, name: "goerli" },
    SafeChain { prefix: "gno", chain_id: 100, name: "gnosis-chain" },
    SafeChain { prefix: "matic", chain_id: 137, name: "polygon" },
    SafeChain { prefix: "sep", chain_id: 11155111, name: "sepolia" },
];

/// A parsed `<chainPrefix>:<address>` Safe reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeAddress {
    pub prefix: &'static str,
    pub address: Address,
    pub chain_id: u64,
    /// Network name used in the transaction service host
    pub name: &'static str,
}

impl SafeAddress {
    /// Default transaction service base URL for this chain.
    pub fn service_url(&self) -> String {
        format!("https://safe-transaction-{}.safe.global/api/v1", self.name)
    }
}

impl FromStr for SafeAddress {
    type Err = SafeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (prefix, address) = raw
            .split_once(':')
            .ok_or_else(|| SafeError::InvalidAddress(format!("expected <prefix>:<address>, got \"{raw}\"")))?;

        let chain = SAFE_CHAINS
            .iter()
            .find(|c| c.prefix == prefix)
            .ok_or_else(|| SafeError::UnsupportedNetwork(prefix.to_string()))?;

        let address = Address::from_str(address.trim())
            .map_err(|e| SafeError::InvalidAddress(e.to_string()))?;

        Ok(Self {
            prefix: chain.prefix,
            address,
            chain_id: chain.chain_id,
            name: chain.name,
        })
    }
}

impl fmt::Display for SafeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_prefixes() {
        let safe: SafeAddress = "gor:0x0000000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(safe.chain_id, 5);
        assert_eq!(safe.name, "goerli");
        assert_eq!(safe.address, Address::with_last_byte(1));
        assert_eq!(
            safe.service_url(),
            "https://safe-transaction-goerli.safe.global/api/v1"
        );

        let safe: SafeAddress = "matic:0x0000000000000000000000000000000000000002".parse().unwrap();
        assert_eq!(safe.chain_id, 137);
        assert_eq!(safe.to_string(), "matic:0x0000000000000000000000000000000000000002");
    }

    #[test]
    fn rejects_unknown_prefix_and_bad_address() {
        assert!(matches!(
            "xyz:0x0000000000000000000000000000000000000001".parse::<SafeAddress>(),
            Err(SafeError::UnsupportedNetwork(p)) if p == "xyz"
        ));
        assert!(matches!(
            "gor:0x1234".parse::<SafeAddress>(),
            Err(SafeError::InvalidAddress(_))
        ));
        assert!(matches!(
            "0x0000000000000000000000000000000000000001".parse::<SafeAddress>(),
            Err(SafeError::InvalidAddress(_))
        ));
    }
}
