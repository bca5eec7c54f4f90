// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction building, signing and broadcasting.
//!
//! Transactions are signed through [`KeyPair::sign_digest`] so that local
//! keys and KMS keys go through the same path. EIP-1559 is used when the
//! latest block reports a base fee, legacy transactions otherwise.

use alloy::{
    consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy},
    eips::{eip2718::Encodable2718, BlockNumberOrTag},
    primitives::{TxKind, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};

use super::client::ChainClientError;
use super::types::{ContractCall, TxReceipt};
use crate::keys::KeyPair;

/// Standard priority fee (1.5 gwei).
const PRIORITY_FEE: u128 = 1_500_000_000;

/// How a transaction is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pricing {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

/// Signs and sends contract calls on one chain.
pub struct TxBuilder<'a, P> {
    provider: &'a P,
    chain_id: u64,
}

impl<'a, P: Provider> TxBuilder<'a, P> {
    pub fn new(provider: &'a P, chain_id: u64) -> Self {
        Self { provider, chain_id }
    }

    /// Pricing from the latest block, or a fixed gas price (wei) when given.
    pub async fn pricing(&self, gas_price: Option<u128>) -> Result<Pricing, ChainClientError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get block: {}", e)))?
            .ok_or_else(|| ChainClientError::RpcError("No latest block".to_string()))?;

        match (block.header.base_fee_per_gas, gas_price) {
            (Some(_), Some(price)) => Ok(Pricing::Eip1559 {
                max_fee_per_gas: price,
                max_priority_fee_per_gas: price,
            }),
            (Some(base_fee), None) => Ok(eip1559_pricing(base_fee as u128)),
            (None, Some(price)) => Ok(Pricing::Legacy { gas_price: price }),
            (None, None) => {
                let price = self
                    .provider
                    .get_gas_price()
                    .await
                    .map_err(|e| ChainClientError::RpcError(format!("Failed to get gas price: {}", e)))?;
                Ok(Pricing::Legacy { gas_price: price })
            }
        }
    }

    /// Sign and broadcast `call`, then wait for its receipt.
    ///
    /// `on_broadcast` receives the transaction hash as soon as the node
    /// accepts the transaction, before the receipt is awaited.
    pub async fn send_call(
        &self,
        call: &ContractCall,
        signer: &KeyPair,
        gas_price: Option<u128>,
        on_broadcast: impl FnOnce(&str),
    ) -> Result<TxReceipt, ChainClientError> {
        let from = signer.address();

        let request = TransactionRequest::default()
            .from(from)
            .to(call.to)
            .value(call.value)
            .input(call.data.clone().into());

        let gas_limit = self
            .provider
            .estimate_gas(request)
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Gas estimation failed: {}", e)))?;

        let nonce = self
            .provider
            .get_transaction_count(from)
            .pending()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get nonce: {}", e)))?;

        let pricing = self.pricing(gas_price).await?;
        tracing::debug!(function = call.function, gas_limit, nonce, ?pricing, "Signing transaction");

        let raw = match pricing {
            Pricing::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let tx = TxEip1559 {
                    chain_id: self.chain_id,
                    nonce,
                    gas_limit,
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                    to: TxKind::Call(call.to),
                    value: call.value,
                    access_list: Default::default(),
                    input: call.data.clone(),
                };
                let signature = signer.sign_digest(&tx.signature_hash()).await?;
                TxEnvelope::from(tx.into_signed(signature)).encoded_2718()
            }
            Pricing::Legacy { gas_price } => {
                let tx = TxLegacy {
                    chain_id: Some(self.chain_id),
                    nonce,
                    gas_price,
                    gas_limit,
                    to: TxKind::Call(call.to),
                    value: call.value,
                    input: call.data.clone(),
                };
                let signature = signer.sign_digest(&tx.signature_hash()).await?;
                TxEnvelope::from(tx.into_signed(signature)).encoded_2718()
            }
        };

        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| ChainClientError::TransactionFailed(format!("Failed to send: {}", e)))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        tracing::info!(%tx_hash, function = call.function, "Transaction broadcast");
        on_broadcast(&tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(ChainClientError::TransactionFailed(format!(
                "{} reverted in transaction {}",
                call.function, tx_hash
            )));
        }

        Ok(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: receipt.gas_used,
        })
    }
}

/// Max fee = 2 * base_fee + priority_fee (allows for base fee increase).
fn eip1559_pricing(base_fee: u128) -> Pricing {
    Pricing::Eip1559 {
        max_fee_per_gas: base_fee.saturating_mul(2).saturating_add(PRIORITY_FEE),
        max_priority_fee_per_gas: PRIORITY_FEE,
    }
}

/// Parse a human-readable amount to its smallest unit.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (9 for gwei)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ChainClientError> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 {
        return Err(ChainClientError::InvalidAmount(
            "Invalid amount format".to_string(),
        ));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| ChainClientError::InvalidAmount(format!("Invalid whole number in \"{amount}\"")))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(ChainClientError::InvalidAmount(format!(
                "Too many decimal places (max {})",
                decimals
            )));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| ChainClientError::InvalidAmount("Invalid decimal".to_string()))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| ChainClientError::InvalidAmount("Amount overflow".to_string()))?;

    Ok(U256::from(total))
}

/// Gas price in wei from a gwei string.
pub fn parse_gwei(gwei: &str) -> Result<u128, ChainClientError> {
    let wei = parse_amount(gwei, 9)?;
    u128::try_from(wei).map_err(|_| ChainClientError::InvalidAmount("Amount overflow".to_string()))
}
