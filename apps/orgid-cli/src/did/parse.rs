// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `did:orgid` and `blockchainAccountId` parsing.

use std::str::FromStr;

use alloy::primitives::{Address, B256};

use super::DidError;

/// Network assumed when a DID carries none.
pub const DEFAULT_NETWORK: &str = "1";

/// A parsed `did:orgid:[<network>:]0x<orgId>[?query][#fragment]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDid {
    /// DID without query and fragment
    pub did: String,
    pub network: String,
    pub org_id: B256,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl ParsedDid {
    /// DID with the network written out, as stored by bootstrap.
    pub fn build(network: &str, org_id: B256) -> String {
        format!("did:orgid:{network}:{org_id}")
    }
}

/// Parse an ORGiD DID or DID URL.
pub fn parse_did(raw: &str) -> Result<ParsedDid, DidError> {
    let invalid = || DidError::InvalidDid(raw.to_string());

    let (rest, fragment) = match raw.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment.to_string())),
        None => (raw, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, Some(query.to_string())),
        None => (rest, None),
    };

    let id_part = base.strip_prefix("did:orgid:").ok_or_else(invalid)?;
    let (network, id) = match id_part.split_once(':') {
        Some((network, id)) => {
            if network.is_empty() || !network.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            (network.to_string(), id)
        }
        None => (DEFAULT_NETWORK.to_string(), id_part),
    };

    let hex = id.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let org_id = B256::from_str(id).map_err(|_| invalid())?;

    if fragment.as_deref() == Some("") || query.as_deref() == Some("") {
        return Err(invalid());
    }

    Ok(ParsedDid {
        did: base.to_string(),
        network,
        org_id,
        query,
        fragment,
    })
}

/// A parsed `blockchainAccountId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockchainAccountId {
    pub address: Address,
    /// Blockchain namespace, `eip155` for EVM chains
    pub namespace: String,
    pub chain_id: String,
}

impl BlockchainAccountId {
    /// Render as `<address>@eip155:<chainId>`.
    pub fn format(address: Address, chain_id: &str) -> String {
        format!("{address}@eip155:{chain_id}")
    }
}

/// Parse `<address>@<namespace>:<chainId>` or CAIP-10 `<namespace>:<chainId>:<address>`.
pub fn parse_blockchain_account_id(raw: &str) -> Result<BlockchainAccountId, DidError> {
    let invalid = || DidError::InvalidAccountId(raw.to_string());

    let (address, namespace, chain_id) = if let Some((address, chain)) = raw.split_once('@') {
        let (namespace, chain_id) = chain.split_once(':').ok_or_else(invalid)?;
        (address, namespace, chain_id)
    } else {
        let mut parts = raw.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(chain_id), Some(address)) => (address, namespace, chain_id),
            _ => return Err(invalid()),
        }
    };

    if namespace.is_empty() || chain_id.is_empty() {
        return Err(invalid());
    }

    Ok(BlockchainAccountId {
        address: Address::from_str(address).map_err(|_| invalid())?,
        namespace: namespace.to_string(),
        chain_id: chain_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORG_ID: &str = "0x7d00a5a3ca0d4b3a0e3c4c3a2dbcc2d7c0bb0d6f2fc2a39f0ad1e3e0fa5b2c1e";

    #[test]
    fn parses_full_did_url() {
        let raw = format!("did:orgid:5:{ORG_ID}?version=2#key-1");
        let parsed = parse_did(&raw).unwrap();

        assert_eq!(parsed.did, format!("did:orgid:5:{ORG_ID}"));
        assert_eq!(parsed.network, "5");
        assert_eq!(parsed.org_id, B256::from_str(ORG_ID).unwrap());
        assert_eq!(parsed.query.as_deref(), Some("version=2"));
        assert_eq!(parsed.fragment.as_deref(), Some("key-1"));
    }

    #[test]
    fn network_defaults_to_mainnet() {
        let parsed = parse_did(&format!("did:orgid:{ORG_ID}")).unwrap();
        assert_eq!(parsed.network, DEFAULT_NETWORK);
        assert!(parsed.fragment.is_none());
    }

    #[test]
    fn build_round_trips() {
        let org_id = B256::from_str(ORG_ID).unwrap();
        let did = ParsedDid::build("137", org_id);
        assert_eq!(parse_did(&did).unwrap().org_id, org_id);
    }

    #[test]
    fn rejects_malformed_dids() {
        for raw in [
            "did:web:example.com",
            "did:orgid:5:0x1234",
            "did:orgid:goerli:0x7d00a5a3ca0d4b3a0e3c4c3a2dbcc2d7c0bb0d6f2fc2a39f0ad1e3e0fa5b2c1e",
            "did:orgid:5:7d00a5a3ca0d4b3a0e3c4c3a2dbcc2d7c0bb0d6f2fc2a39f0ad1e3e0fa5b2c1e",
            "did:orgid:5:0x7d00a5a3ca0d4b3a0e3c4c3a2dbcc2d7c0bb0d6f2fc2a39f0ad1e3e0fa5b2c1e#",
        ] {
            assert!(parse_did(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn parses_both_account_id_forms() {
        let address = Address::repeat_byte(0xab);

        let legacy = parse_blockchain_account_id(&BlockchainAccountId::format(address, "5")).unwrap();
        assert_eq!(legacy.address, address);
        assert_eq!(legacy.namespace, "eip155");
        assert_eq!(legacy.chain_id, "5");

        let caip = parse_blockchain_account_id(&format!("eip155:137:{address}")).unwrap();
        assert_eq!(caip.address, address);
        assert_eq!(caip.chain_id, "137");
    }

    #[test]
    fn rejects_bad_account_ids() {
        assert!(parse_blockchain_account_id("0x1234@eip155:5").is_err());
        assert!(parse_blockchain_account_id("nonsense").is_err());
        assert!(parse_blockchain_account_id("0xabababababababababababababababababababab@eip155").is_err());
    }
}
