// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Safe transaction service client.

use alloy::primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};

use super::{SafeAddress, SafeError};

/// Call to estimate, as the service expects it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationRequest {
    pub to: String,
    pub value: String,
    pub data: String,
    pub operation: u8,
}

/// A signed multisig transaction proposal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub to: String,
    pub value: String,
    pub data: String,
    pub operation: u8,
    pub safe_tx_gas: String,
    pub base_gas: String,
    pub gas_price: String,
    pub gas_token: String,
    pub refund_receiver: String,
    pub nonce: u64,
    pub contract_transaction_hash: String,
    pub sender: String,
    pub signature: String,
}

/// Operations of the Safe transaction service used for proposals.
#[allow(async_fn_in_trait)]
pub trait SafeRelay {
    /// Current nonce of the Safe.
    async fn nonce(&self, safe: Address) -> Result<u64, SafeError>;

    /// Estimated `safeTxGas` for a call.
    async fn estimate(&self, safe: Address, call: &EstimationRequest) -> Result<String, SafeError>;

    /// Submit a signed proposal.
    async fn propose(&self, safe: Address, proposal: &ProposalRequest) -> Result<(), SafeError>;
}

#[derive(Deserialize)]
struct SafeInfo {
    #[serde(deserialize_with = "number_or_string")]
    nonce: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Estimation {
    #[serde(deserialize_with = "number_or_string")]
    safe_tx_gas: String,
}

/// The service has returned both JSON numbers and decimal strings for these fields.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// HTTP client for `https://safe-transaction-<network>.safe.global/api/v1`.
#[derive(Debug, Clone)]
pub struct SafeTransactionService {
    base_url: String,
    client: reqwest::Client,
}

impl SafeTransactionService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SafeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SafeError::Relay(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Service for the Safe's chain, or `override_url` when set.
    pub fn for_safe(safe: &SafeAddress, override_url: Option<&str>) -> Result<Self, SafeError> {
        match override_url {
            Some(url) => Self::new(url),
            None => Self::new(safe.service_url()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SafeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SafeError::Relay(format!("{status}: {body}")))
    }
}

impl SafeRelay for SafeTransactionService {
    async fn nonce(&self, safe: Address) -> Result<u64, SafeError> {
        let url = format!("{}/safes/{safe}/", self.base_url);
        tracing::debug!(%url, "Fetching Safe nonce");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SafeError::Relay(e.to_string()))?;
        let info: SafeInfo = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SafeError::Relay(format!("Invalid Safe info: {e}")))?;

        info.nonce
            .parse()
            .map_err(|_| SafeError::Relay(format!("Invalid Safe nonce \"{}\"", info.nonce)))
    }

    async fn estimate(&self, safe: Address, call: &EstimationRequest) -> Result<String, SafeError> {
        let url = format!(
            "{}/safes/{safe}/multisig-transactions/estimations/",
            self.base_url
        );
        let response = self
            .client
            .post(&url)
            .json(call)
            .send()
            .await
            .map_err(|e| SafeError::Relay(e.to_string()))?;
        let estimation: Estimation = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SafeError::Relay(format!("Invalid estimation: {e}")))?;

        Ok(estimation.safe_tx_gas)
    }

    async fn propose(&self, safe: Address, proposal: &ProposalRequest) -> Result<(), SafeError> {
        let url = format!("{}/safes/{safe}/multisig-transactions/", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(proposal)
            .send()
            .await
            .map_err(|e| SafeError::Relay(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}
