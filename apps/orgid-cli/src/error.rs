// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::blockchain::ChainClientError;
use crate::crypto::SecretError;
use crate::did::DidError;
use crate::ipfs::IpfsError;
use crate::keys::KeyError;
use crate::safe::SafeError;
use crate::storage::StorageError;

/// Every way an operation can fail. All of them end the invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unable to decrypt")]
    Decryption,

    #[error("Signer address {actual} does not match the owner {expected}")]
    OwnershipMismatch { expected: String, actual: String },

    #[error("Remote signing failed: {0}")]
    RemoteSigning(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error(transparent)]
    Storage(StorageError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

impl CliError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Process exit code.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<StorageError> for CliError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(what) => CliError::NotFound(what),
            other => CliError::Storage(other),
        }
    }
}

impl From<SecretError> for CliError {
    fn from(error: SecretError) -> Self {
        match error {
            SecretError::Decryption => CliError::Decryption,
            SecretError::WeakPassphrase => CliError::InvalidInput(error.to_string()),
            SecretError::Encryption(message) => CliError::Configuration(message),
        }
    }
}

impl From<KeyError> for CliError {
    fn from(error: KeyError) -> Self {
        match error {
            KeyError::Secret(secret) => secret.into(),
            KeyError::RemoteSigning(message) => CliError::RemoteSigning(message),
            other => CliError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ChainClientError> for CliError {
    fn from(error: ChainClientError) -> Self {
        match error {
            ChainClientError::Signing(key) => key.into(),
            ChainClientError::TransactionFailed(message) => CliError::TransactionFailed(message),
            ChainClientError::InvalidRpcUrl(message) => CliError::Configuration(message),
            ChainClientError::InvalidAmount(message) => CliError::InvalidInput(message),
            other => CliError::Network(other.to_string()),
        }
    }
}

impl From<SafeError> for CliError {
    fn from(error: SafeError) -> Self {
        match error {
            SafeError::Signing(key) => key.into(),
            SafeError::Relay(message) => CliError::Network(message),
            other => CliError::InvalidInput(other.to_string()),
        }
    }
}

impl From<DidError> for CliError {
    fn from(error: DidError) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}

impl From<IpfsError> for CliError {
    fn from(error: IpfsError) -> Self {
        CliError::Network(error.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::InvalidInput(format!("Invalid JSON: {error}"))
    }
}

pub type CliResult<T> = Result<T, CliError>;
