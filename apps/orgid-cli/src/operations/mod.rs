// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Operations
//!
//! One module per `--operation`. Each operation is a short sequential
//! script over a [`Context`]: prompt, read/write the project file, call an
//! external service, print the result.
//!
//! Results go to stdout; progress messages and prompts go to stderr.

pub mod bootstrap;
pub mod config;
pub mod create;
pub mod deploy;
pub mod jwt;
pub mod keys_import;
pub mod org_vc;
pub mod resolve;
pub mod transfer;
pub mod update;

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, B256};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::blockchain::{
    network_config, parse_gwei, ContractCall, NetworkConfig, OrgIdClient, TxReceipt,
};
use crate::cli::Args;
use crate::config::Settings;
use crate::crypto;
use crate::did::{parse_did, ParsedDid};
use crate::error::{CliError, CliResult};
use crate::ipfs::{parse_uri, DocumentUri, IpfsClient};
use crate::keys::{parse_private_key, KeyPair};
use crate::prompt::Prompter;
use crate::safe::{propose, SafeAddress, SafeTransactionService};
use crate::storage::{ConfigKind, KeyRecord, KeyType, OrgIdRecord, ProjectPaths, ProjectStore};

/// The ten operations selectable with `--operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Config,
    OrgIdVc,
    DeployIpfs,
    Bootstrap,
    KeysImport,
    Create,
    Update,
    Resolve,
    Transfer,
    Jwt,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Config => "config",
            Operation::OrgIdVc => "orgIdVc",
            Operation::DeployIpfs => "deploy:ipfs",
            Operation::Bootstrap => "bootstrap",
            Operation::KeysImport => "keys:import",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Resolve => "resolve",
            Operation::Transfer => "transfer",
            Operation::Jwt => "jwt",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config" => Ok(Operation::Config),
            "orgIdVc" => Ok(Operation::OrgIdVc),
            "deploy:ipfs" => Ok(Operation::DeployIpfs),
            "bootstrap" => Ok(Operation::Bootstrap),
            "keys:import" => Ok(Operation::KeysImport),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "resolve" => Ok(Operation::Resolve),
            "transfer" => Ok(Operation::Transfer),
            "jwt" => Ok(Operation::Jwt),
            other => Err(CliError::configuration(format!(
                "Unknown operation type \"{other}\""
            ))),
        }
    }
}

/// Run one operation to completion.
pub async fn run(operation: Operation, args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    tracing::debug!(%operation, project = %ctx.paths().project_file().display(), "Running operation");

    match operation {
        Operation::Config => config::run(args, ctx),
        Operation::OrgIdVc => org_vc::run(args, ctx).await,
        Operation::DeployIpfs => deploy::run(args, ctx).await.map(|_| ()),
        Operation::Bootstrap => bootstrap::run(args, ctx).map(|_| ()),
        Operation::KeysImport => keys_import::run(args, ctx).await,
        Operation::Create => create::run(args, ctx).await,
        Operation::Update => update::run(args, ctx).await,
        Operation::Resolve => resolve::run(args, ctx).await,
        Operation::Transfer => transfer::run(args, ctx).await,
        Operation::Jwt => jwt::run(args, ctx).await.map(|_| ()),
    }
}

/// A contract call queued for submission.
#[derive(Debug, Clone)]
pub struct PlannedCall {
    pub call: ContractCall,
    /// Fixed `safeTxGas` for multisig proposals
    pub safe_tx_gas: Option<&'static str>,
}

impl From<ContractCall> for PlannedCall {
    fn from(call: ContractCall) -> Self {
        Self {
            call,
            safe_tx_gas: None,
        }
    }
}

/// How queued calls were submitted.
pub enum Submitted {
    /// Proposed to a Safe; nothing broadcast
    Proposed { nonces: Vec<u64> },
    /// Broadcast and confirmed
    Broadcast {
        client: OrgIdClient,
        receipts: Vec<TxReceipt>,
    },
}

/// Everything an operation needs for one invocation.
pub struct Context<'a> {
    pub store: ProjectStore,
    pub settings: Settings,
    pub prompt: &'a dyn Prompter,
}

impl<'a> Context<'a> {
    pub fn new(settings: Settings, prompt: &'a dyn Prompter) -> Self {
        let paths = ProjectPaths::new(&settings.project_dir)
            .with_file_name(settings.project_file.clone());
        Self {
            store: ProjectStore::new(paths),
            settings,
            prompt,
        }
    }

    pub fn paths(&self) -> &ProjectPaths {
        self.store.paths()
    }

    /// The record named by `--did`, or one chosen interactively.
    pub fn select_org_id(&self, did: Option<&str>, created: Option<bool>) -> CliResult<OrgIdRecord> {
        if let Some(did) = did {
            return Ok(self.store.org_id(did)?);
        }

        let records = self.store.org_ids(created)?;
        if records.is_empty() {
            return Err(CliError::not_found("Registered ORGiD in the project"));
        }

        let choices: Vec<String> = records.iter().map(|r| r.did.clone()).collect();
        let index = self.prompt.select("Choose an ORGiD", &choices)?;
        records
            .into_iter()
            .nth(index)
            .ok_or_else(|| CliError::invalid_input("ORGiD not selected"))
    }

    /// A registered key of one of `types`, chosen interactively.
    pub fn select_key(&self, types: &[KeyType], message: &str) -> CliResult<KeyRecord> {
        let records = self.store.keys(types)?;
        if records.is_empty() {
            let kinds: Vec<&str> = types.iter().map(KeyType::as_str).collect();
            return Err(CliError::not_found(format!(
                "Registered key pair of type {}",
                kinds.join("|")
            )));
        }

        let choices: Vec<String> = records
            .iter()
            .map(|r| format!("{} ({})", r.tag, r.key_type))
            .collect();
        let index = self.prompt.select(message, &choices)?;
        records
            .into_iter()
            .nth(index)
            .ok_or_else(|| CliError::invalid_input("Key pair not selected"))
    }

    /// Ask for the record's passphrase and build the signer.
    pub async fn unlock_key(&self, record: &KeyRecord) -> CliResult<KeyPair> {
        let passphrase = match record.key_type {
            KeyType::Multisig => String::new(),
            _ => self.prompt.password(&format!(
                "Enter the password for the key pair \"{}\"",
                record.tag
            ))?,
        };
        Ok(KeyPair::unlock(record, &passphrase).await?)
    }

    /// Ask for a passphrase that will protect a new secret.
    pub fn new_passphrase(&self) -> CliResult<String> {
        let passphrase = self
            .prompt
            .password("Please provide an encryption password for keys storage")?;
        crypto::validate_passphrase(&passphrase)?;
        Ok(passphrase)
    }

    /// A config value, decrypted when it is stored encrypted.
    pub fn config_value(&self, kind: ConfigKind, id: &str) -> CliResult<String> {
        let record = self.store.config_record(kind, id)?;
        if !record.encrypted {
            return Ok(record.value);
        }

        let passphrase = self.prompt.password(&format!(
            "Enter the password for the encrypted {kind} record #{id}"
        ))?;
        Ok(crypto::decrypt(&record.value, &passphrase)?)
    }

    /// Registry client for `network` using the project's provider URI.
    pub fn chain_client(&self, network: &str) -> CliResult<OrgIdClient> {
        let config = network_config(network).map_err(CliError::Configuration)?;

        let url = match self.config_value(ConfigKind::NetworkProviders, network) {
            Err(CliError::NotFound(_)) => {
                return Err(CliError::configuration(format!(
                    "Network provider URI for the network #{network} is not found. \
                     Please add it to the project config using \"--operation config --record networkProviders\""
                )))
            }
            other => other?,
        };

        Ok(OrgIdClient::new(config.clone(), &url)?)
    }

    pub fn ipfs(&self) -> CliResult<IpfsClient> {
        Ok(IpfsClient::new(
            &self.settings.web3_storage_url,
            &self.settings.ipfs_gateway_url,
        )?)
    }

    /// Load a JSON document from IPFS, HTTP(S) or a project-relative path.
    pub async fn read_document<T: DeserializeOwned>(&self, uri: &str) -> CliResult<T> {
        match parse_uri(uri) {
            DocumentUri::File(path) => Ok(self.store.storage().read_json(self.paths().resolve(path))?),
            DocumentUri::Ipfs(_) | DocumentUri::Http(_) => Ok(self.ipfs()?.fetch_json(uri).await?),
        }
    }

    /// Operator-supplied gas price in wei, if they want one.
    pub fn gas_price(&self) -> CliResult<Option<u128>> {
        if !self
            .prompt
            .confirm("Do you want to define your own gas price for the transaction?")?
        {
            return Ok(None);
        }
        let gwei = self.prompt.text("Set gas price (GWEI)")?;
        Ok(Some(parse_gwei(&gwei)?))
    }

    /// Key of one Safe owner, registered or entered.
    pub async fn multisig_owner(&self, safe: &SafeAddress) -> CliResult<KeyPair> {
        let owner_types = [KeyType::Ethereum, KeyType::KmsEthereum];
        let registered = !self.store.keys(&owner_types)?.is_empty();

        if registered
            && self.prompt.confirm(&format!(
                "Do you want to sign the {safe} proposal with a registered key?"
            ))?
        {
            let record = self.select_key(&owner_types, "Choose a Safe owner key")?;
            return self.unlock_key(&record).await;
        }

        let private_key = self.prompt.password(&format!(
            "Please enter a private key of one of the owners of the {safe} multisig"
        ))?;
        if private_key.is_empty() {
            return Err(CliError::invalid_input("A Safe owner key is required"));
        }
        Ok(KeyPair::Ethereum(parse_private_key(&private_key)?))
    }

    /// Record the hash of a broadcast transaction. Failures are only logged.
    pub fn annotate_tx_hash(&self, did: &str, tx_hash: &str) {
        if let Err(error) = self
            .store
            .update_org_id(did, |record| record.tx_hash = Some(tx_hash.to_string()))
        {
            tracing::error!(did, tx_hash, %error, "Unable to update project file");
        }
    }

    /// Send `calls` in order: proposed to the Safe for multisig keys,
    /// broadcast otherwise.
    pub async fn submit(
        &self,
        did: &str,
        network: &NetworkConfig,
        key: &KeyPair,
        calls: &[PlannedCall],
    ) -> CliResult<Submitted> {
        if let KeyPair::Multisig(safe) = key {
            if safe.chain_id != network.chain_id {
                return Err(CliError::configuration(format!(
                    "Safe {safe} is on chain #{} but the ORGiD is on network #{}",
                    safe.chain_id, network.chain_id
                )));
            }

            let owner = self.multisig_owner(safe).await?;
            let relay = SafeTransactionService::for_safe(safe, self.settings.safe_service_url.as_deref())?;

            let mut nonces = Vec::with_capacity(calls.len());
            for planned in calls {
                report(format!("Proposing \"{}\" to {safe}...", planned.call.function));
                let nonce = propose(
                    &relay,
                    safe,
                    &planned.call,
                    &owner,
                    planned.safe_tx_gas,
                    nonces.last().copied(),
                )
                .await?;
                nonces.push(nonce);
            }
            return Ok(Submitted::Proposed { nonces });
        }

        let client = self.chain_client(&network.chain_id.to_string())?;
        let gas_price = self.gas_price()?;

        let mut receipts = Vec::with_capacity(calls.len());
        {
            let builder = client.tx_builder();
            for planned in calls {
                report(format!("Sending transaction \"{}\"...", planned.call.function));
                let receipt = builder
                    .send_call(&planned.call, key, gas_price, |tx_hash| {
                        report(format!("Transaction hash: {tx_hash}"));
                        self.annotate_tx_hash(did, tx_hash);
                    })
                    .await?;
                receipts.push(receipt);
            }
        }

        Ok(Submitted::Broadcast { client, receipts })
    }
}

/// DID, registry network and stored salt of an ORGiD record.
pub struct OrgTarget {
    pub parsed: ParsedDid,
    pub network: &'static NetworkConfig,
    pub salt: B256,
}

impl OrgTarget {
    pub fn of(record: &OrgIdRecord) -> CliResult<Self> {
        let parsed = parse_did(&record.did)?;
        let network = network_config(&parsed.network).map_err(CliError::Configuration)?;
        let salt = B256::from_str(&record.salt)
            .map_err(|_| CliError::invalid_input(format!("Invalid salt \"{}\"", record.salt)))?;
        Ok(Self {
            parsed,
            network,
            salt,
        })
    }
}

/// Check that `key` controls `owner`.
pub fn ensure_owner(owner: &str, key: &KeyPair) -> CliResult<Address> {
    let expected = Address::from_str(owner)
        .map_err(|_| CliError::invalid_input(format!("Invalid owner address \"{owner}\"")))?;
    let actual = key.address();
    if actual != expected {
        return Err(CliError::OwnershipMismatch {
            expected: expected.to_checksum(None),
            actual: actual.to_checksum(None),
        });
    }
    Ok(expected)
}

/// Pretty-print a result object to stdout.
pub fn print_object<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Progress message for the operator.
pub fn report(message: impl fmt::Display) {
    eprintln!("{message}");
}

/// Boolean flags are passed as `--flag true`.
pub fn flag_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("true" | "yes" | "1"))
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;

    use super::*;
    use crate::storage::PublicKeyRef;

    pub const OWNER_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    pub const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    pub const DID: &str =
        "did:orgid:5:0x7d00a5a3ca0d4b3a0e3c4c3a2dbcc2d7c0bb0d6f2fc2a39f0ad1e3e0fa5b2c1e";

    pub fn settings(dir: &tempfile::TempDir) -> Settings {
        Settings::from_lookup(|_| None).with_project_dir(dir.path())
    }

    pub fn address_of(private_key: &str) -> Address {
        parse_private_key(private_key).map(|s| s.address()).unwrap()
    }

    /// Register an ethereum key encrypted under `passphrase`.
    pub fn add_ethereum_key(ctx: &Context<'_>, tag: &str, private_key: &str, passphrase: &str) {
        ctx.store
            .add_key(KeyRecord {
                tag: tag.to_string(),
                key_type: KeyType::Ethereum,
                public_key: PublicKeyRef::Address(address_of(private_key).to_checksum(None)),
                private_key: Some(crypto::encrypt(private_key, passphrase).unwrap()),
                multisig: None,
                created_at: Utc::now(),
            })
            .unwrap();
    }

    pub fn add_org_id(ctx: &Context<'_>, owner: Address, created: bool, vc: Option<&str>) {
        ctx.store
            .upsert_org_id(OrgIdRecord {
                did: DID.to_string(),
                salt: B256::repeat_byte(0x11).to_string(),
                owner: owner.to_checksum(None),
                org_json: None,
                org_id_vc: vc.map(str::to_string),
                created,
                tx_hash: None,
                token_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;

    #[test]
    fn operation_names_round_trip() {
        for operation in [
            Operation::Config,
            Operation::OrgIdVc,
            Operation::DeployIpfs,
            Operation::Bootstrap,
            Operation::KeysImport,
            Operation::Create,
            Operation::Update,
            Operation::Resolve,
            Operation::Transfer,
            Operation::Jwt,
        ] {
            assert_eq!(operation.as_str().parse::<Operation>().unwrap(), operation);
        }
        assert!(matches!(
            "deploy".parse::<Operation>(),
            Err(CliError::Configuration(_))
        ));
    }

    #[test]
    fn ownership_check() {
        let key = KeyPair::Ethereum(parse_private_key(OWNER_KEY).unwrap());
        let owner = address_of(OWNER_KEY).to_checksum(None);
        assert!(ensure_owner(&owner, &key).is_ok());

        let other = address_of(OTHER_KEY).to_checksum(None);
        assert!(matches!(
            ensure_owner(&other, &key),
            Err(CliError::OwnershipMismatch { .. })
        ));
    }

    #[test]
    fn missing_provider_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        let error = ctx.chain_client("5").err().unwrap();
        assert!(matches!(error, CliError::Configuration(message) if message.contains("#5")));

        let error = ctx.chain_client("1").err().unwrap();
        assert!(matches!(error, CliError::Configuration(message) if message.contains("not supported")));
    }

    #[test]
    fn org_id_selection() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new([DID]);
        let ctx = Context::new(settings(&dir), &prompt);

        assert!(matches!(
            ctx.select_org_id(None, None),
            Err(CliError::NotFound(_))
        ));

        add_org_id(&ctx, address_of(OWNER_KEY), false, None);
        assert_eq!(ctx.select_org_id(None, Some(false)).unwrap().did, DID);
        assert_eq!(ctx.select_org_id(Some(DID), None).unwrap().did, DID);
        assert!(matches!(
            ctx.select_org_id(None, Some(true)),
            Err(CliError::NotFound(_))
        ));
    }

    #[test]
    fn boolean_flags() {
        assert!(flag_enabled(Some("true")));
        assert!(!flag_enabled(Some("false")));
        assert!(!flag_enabled(None));
    }
}
