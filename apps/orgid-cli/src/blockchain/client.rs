// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC client for a network hosting the ORGiD registry.

use alloy::{
    network::Ethereum,
    primitives::B256,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, ProviderBuilder, RootProvider,
    },
};

use super::registry::OrgIdContract;
use super::transactions::TxBuilder;
use super::types::{NetworkConfig, OrgIdData};

/// HTTP provider type (with the recommended fillers).
pub type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Client for one supported network.
pub struct OrgIdClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
}

impl OrgIdClient {
    /// Create a client for `network` using the provider at `rpc_url`.
    pub fn new(network: NetworkConfig, rpc_url: &str) -> Result<Self, ChainClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Read an ORGiD from the registry.
    pub async fn get_org_id(&self, org_id: B256) -> Result<Option<OrgIdData>, ChainClientError> {
        OrgIdContract::new(&self.provider, self.network.registry)
            .get_org_id(org_id)
            .await
    }

    /// Transaction builder bound to this network.
    pub fn tx_builder(&self) -> TxBuilder<'_, HttpProvider> {
        TxBuilder::new(&self.provider, self.network.chain_id)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error(transparent)]
    Signing(#[from] crate::keys::KeyError),
}
