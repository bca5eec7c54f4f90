// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-712 Safe transactions and proposal submission.

use std::str::FromStr;

use alloy::{
    primitives::{Address, B256, U256},
    sol,
    sol_types::{Eip712Domain, SolStruct},
};

use super::relay::{EstimationRequest, ProposalRequest, SafeRelay};
use super::{SafeAddress, SafeError};
use crate::blockchain::ContractCall;
use crate::keys::KeyPair;

sol! {
    /// Safe transaction as hashed by the Safe contract.
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

/// EIP-712 hash of `tx` under the Safe's `{ chainId, verifyingContract }` domain.
pub fn safe_tx_hash(safe: &SafeAddress, tx: &SafeTx) -> B256 {
    let domain = Eip712Domain::new(
        None,
        None,
        Some(U256::from(safe.chain_id)),
        Some(safe.address),
        None,
    );
    tx.eip712_signing_hash(&domain)
}

/// Propose `call` to the Safe, signed by `owner`.
///
/// The Safe nonce is fetched from the service unless `previous_nonce` is
/// given, in which case the proposal takes the next one. `safe_tx_gas`
/// skips the service estimation. Returns the nonce used.
pub async fn propose<R: SafeRelay>(
    relay: &R,
    safe: &SafeAddress,
    call: &ContractCall,
    owner: &KeyPair,
    safe_tx_gas: Option<&str>,
    previous_nonce: Option<u64>,
) -> Result<u64, SafeError> {
    let nonce = match previous_nonce {
        Some(previous) => previous + 1,
        None => relay.nonce(safe.address).await?,
    };

    let base = EstimationRequest {
        to: call.to.to_checksum(None),
        value: call.value.to_string(),
        data: call.data.to_string(),
        operation: 0,
    };

    let safe_tx_gas = match safe_tx_gas {
        Some(gas) => gas.to_string(),
        None => relay.estimate(safe.address, &base).await?,
    };
    let safe_tx_gas_value = U256::from_str(&safe_tx_gas)
        .map_err(|_| SafeError::Relay(format!("Invalid safeTxGas \"{safe_tx_gas}\"")))?;

    let tx = SafeTx {
        to: call.to,
        value: call.value,
        data: call.data.clone(),
        operation: 0,
        safeTxGas: safe_tx_gas_value,
        baseGas: U256::ZERO,
        gasPrice: U256::ZERO,
        gasToken: Address::ZERO,
        refundReceiver: Address::ZERO,
        nonce: U256::from(nonce),
    };

    let hash = safe_tx_hash(safe, &tx);
    let signature = owner.sign_digest(&hash).await?;

    let proposal = ProposalRequest {
        to: base.to,
        value: base.value,
        data: base.data,
        operation: 0,
        safe_tx_gas,
        base_gas: "0".to_string(),
        gas_price: "0".to_string(),
        gas_token: Address::ZERO.to_checksum(None),
        refund_receiver: Address::ZERO.to_checksum(None),
        nonce,
        contract_transaction_hash: hash.to_string(),
        sender: owner.address().to_checksum(None),
        signature: format!("0x{}", alloy::hex::encode(signature.as_bytes())),
    };

    tracing::info!(safe = %safe, nonce, function = call.function, "Proposing Safe transaction");
    relay.propose(safe.address, &proposal).await?;

    Ok(nonce)
}
