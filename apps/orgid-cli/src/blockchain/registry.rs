// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ORGiD registry contract interactions.

use alloy::{
    primitives::{keccak256, Address, Bytes, B256, U256},
    providers::Provider,
    sol,
    sol_types::SolCall,
};

use super::client::ChainClientError;
use super::types::{ContractCall, OrgIdData};

// ORGiD registry interface (ERC-721 based)
sol! {
    #[sol(rpc)]
    interface IOrgId {
        function getOrgId(bytes32 orgId) external view returns (
            bool exists,
            bytes32 id,
            uint256 tokenId,
            address owner,
            string orgJsonUri,
            string[] delegates
        );
        function createOrgId(bytes32 salt, string orgJsonUri) external returns (bytes32);
        function setOrgJson(bytes32 orgId, string orgJsonUri) external;
        function addDelegates(bytes32 orgId, string[] delegates) external;
        function transferFrom(address from, address to, uint256 tokenId) external;
    }
}

/// ORGiD id the registry assigns to `(owner, salt)`: `keccak256(owner || salt)`.
pub fn org_id_from_salt(owner: Address, salt: B256) -> B256 {
    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(owner.as_slice());
    packed[20..].copy_from_slice(salt.as_slice());
    keccak256(packed)
}

fn call(function: &'static str, registry: Address, data: Vec<u8>) -> ContractCall {
    ContractCall {
        function,
        to: registry,
        value: U256::ZERO,
        data: Bytes::from(data),
    }
}

/// `createOrgId(bytes32,string)`
pub fn create_org_id_call(registry: Address, salt: B256, org_json_uri: &str) -> ContractCall {
    let data = IOrgId::createOrgIdCall {
        salt,
        orgJsonUri: org_json_uri.to_string(),
    }
    .abi_encode();
    call("createOrgId(bytes32,string)", registry, data)
}

/// `setOrgJson(bytes32,string)`
pub fn set_org_json_call(registry: Address, org_id: B256, org_json_uri: &str) -> ContractCall {
    let data = IOrgId::setOrgJsonCall {
        orgId: org_id,
        orgJsonUri: org_json_uri.to_string(),
    }
    .abi_encode();
    call("setOrgJson(bytes32,string)", registry, data)
}

/// `addDelegates(bytes32,string[])`
pub fn add_delegates_call(registry: Address, org_id: B256, delegates: Vec<String>) -> ContractCall {
    let data = IOrgId::addDelegatesCall {
        orgId: org_id,
        delegates,
    }
    .abi_encode();
    call("addDelegates(bytes32,string[])", registry, data)
}

/// `transferFrom(address,address,uint256)`
pub fn transfer_call(registry: Address, from: Address, to: Address, token_id: U256) -> ContractCall {
    let data = IOrgId::transferFromCall {
        from,
        to,
        tokenId: token_id,
    }
    .abi_encode();
    call("transferFrom(address,address,uint256)", registry, data)
}

/// Read-only registry wrapper.
pub struct OrgIdContract<P> {
    contract: IOrgId::IOrgIdInstance<P>,
}

impl<P: Provider + Clone> OrgIdContract<P> {
    pub fn new(provider: &P, registry: Address) -> Self {
        Self {
            contract: IOrgId::new(registry, provider.clone()),
        }
    }

    /// Fetch an ORGiD. `None` when the registry does not know it.
    pub async fn get_org_id(&self, org_id: B256) -> Result<Option<OrgIdData>, ChainClientError> {
        let result = self
            .contract
            .getOrgId(org_id)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;

        if !result.exists {
            return Ok(None);
        }

        Ok(Some(OrgIdData {
            token_id: result.tokenId.to_string(),
            org_id: result.id.to_string(),
            owner: result.owner.to_checksum(None),
            org_json_uri: result.orgJsonUri,
            delegates: result.delegates,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    #[test]
    fn org_id_is_packed_hash_of_owner_and_salt() {
        let owner = address!("0000000000000000000000000000000000000001");
        let salt = B256::repeat_byte(0x22);

        let mut packed = owner.to_vec();
        packed.extend_from_slice(salt.as_slice());
        assert_eq!(org_id_from_salt(owner, salt), keccak256(&packed));
        assert_ne!(org_id_from_salt(owner, B256::ZERO), org_id_from_salt(owner, salt));
    }

    #[test]
    fn create_call_encodes_selector_and_arguments() {
        let registry = address!("e02dF24d8dFdd37B21690DB30F4813cf6c4D9D93");
        let salt = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let call = create_org_id_call(registry, salt, "ipfs://bafy");

        assert_eq!(call.to, registry);
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(&call.data[..4], IOrgId::createOrgIdCall::SELECTOR.as_slice());

        let decoded = IOrgId::createOrgIdCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.salt, salt);
        assert_eq!(decoded.orgJsonUri, "ipfs://bafy");
    }

    #[test]
    fn delegate_and_transfer_calls_round_trip() {
        let registry = Address::repeat_byte(0x01);
        let org_id = B256::repeat_byte(0x02);

        let delegates = vec!["did:orgid:5:0xabc".to_string()];
        let call = add_delegates_call(registry, org_id, delegates.clone());
        assert_eq!(call.function, "addDelegates(bytes32,string[])");
        let decoded = IOrgId::addDelegatesCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.delegates, delegates);

        let call = transfer_call(registry, Address::repeat_byte(3), Address::repeat_byte(4), U256::from(9));
        let decoded = IOrgId::transferFromCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.to, Address::repeat_byte(4));
        assert_eq!(decoded.tokenId, U256::from(9));
    }
}
