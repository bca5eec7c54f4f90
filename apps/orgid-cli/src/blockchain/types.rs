// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{address, Address, Bytes, U256};
use serde::Serialize;

/// Network with a deployed ORGiD registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// ORGiD registry contract address
    pub registry: Address,
}

/// Sokol xDAI Testnet.
pub const SOKOL: NetworkConfig = NetworkConfig {
    name: "Sokol xDAI Testnet",
    chain_id: 77,
    registry: address!("Dd1231c0FD9083DA42eDd2BD4f041d0a54EF7BeE"),
};

/// Columbus.
pub const COLUMBUS: NetworkConfig = NetworkConfig {
    name: "Columbus",
    chain_id: 502,
    registry: address!("d8b75be9a47ffab0b5c27a143b911af7a7bf4076"),
};

/// Goerli Testnet.
pub const GOERLI: NetworkConfig = NetworkConfig {
    name: "Goerli",
    chain_id: 5,
    registry: address!("e02dF24d8dFdd37B21690DB30F4813cf6c4D9D93"),
};

/// Polygon.
pub const POLYGON: NetworkConfig = NetworkConfig {
    name: "Polygon",
    chain_id: 137,
    registry: address!("8a093Cb94663994d19a778c7EA9161352a434c64"),
};

/// Gnosis Chain.
pub const GNOSIS: NetworkConfig = NetworkConfig {
    name: "Gnosis Chain",
    chain_id: 100,
    registry: address!("b63d48e9d1e51305a17F4d95aCa3637BBC181b44"),
};

/// All networks the ORGiD protocol is deployed to.
pub const SUPPORTED_NETWORKS: &[NetworkConfig] = &[SOKOL, COLUMBUS, GOERLI, POLYGON, GNOSIS];

/// Look up a supported network by its chain id (as written in DIDs).
pub fn network_config(chain_id: &str) -> Result<&'static NetworkConfig, String> {
    SUPPORTED_NETWORKS
        .iter()
        .find(|n| n.chain_id.to_string() == chain_id)
        .ok_or_else(|| format!("Network #{chain_id} not supported by ORGiD protocol yet"))
}

/// An encoded contract call, either broadcast directly or proposed to a Safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Function signature, for logs and prompts
    pub function: &'static str,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// On-chain ORGiD data, as printed after a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgIdData {
    pub token_id: String,
    pub org_id: String,
    pub owner: String,
    pub org_json_uri: String,
    pub delegates: Vec<String>,
}

/// Result of a confirmed transaction.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_network_lookup() {
        assert_eq!(network_config("5").unwrap().name, "Goerli");
        assert_eq!(network_config("137").unwrap().registry, POLYGON.registry);
        assert_eq!(
            network_config("1").unwrap_err(),
            "Network #1 not supported by ORGiD protocol yet"
        );
    }
}
