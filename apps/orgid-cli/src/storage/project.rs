// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project file records and the store that reads and rewrites them.
//!
//! The whole project file is loaded, mutated in memory and written back on
//! every change. There is no locking: two invocations against the same
//! project can overwrite each other.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProjectPaths, ProjectStorage, StorageError, StorageResult};

/// Kind of a registered key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyType {
    /// Raw secp256k1 private key
    Ethereum,
    /// secp256k1 key pair imported from PEM files, stored as JWK
    Pem,
    /// Key held by AWS KMS
    KmsEthereum,
    /// Reference to a Safe multisig wallet
    Multisig,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ethereum => "ethereum",
            KeyType::Pem => "pem",
            KeyType::KmsEthereum => "kmsEthereum",
            KeyType::Multisig => "multisig",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ethereum" => Ok(KeyType::Ethereum),
            "pem" => Ok(KeyType::Pem),
            "kmsEthereum" => Ok(KeyType::KmsEthereum),
            "multisig" => Ok(KeyType::Multisig),
            other => Err(format!("Unknown key pair type: \"{other}\"")),
        }
    }
}

/// JSON Web Key for a secp256k1 key.
///
/// `d` is only present in private keys, which are never persisted unencrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// Public part of a key record: an address (or Safe reference) or a JWK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicKeyRef {
    Address(String),
    Jwk(Jwk),
}

impl PublicKeyRef {
    pub fn as_address(&self) -> Option<&str> {
        match self {
            PublicKeyRef::Address(address) => Some(address),
            PublicKeyRef::Jwk(_) => None,
        }
    }

    pub fn as_jwk(&self) -> Option<&Jwk> {
        match self {
            PublicKeyRef::Jwk(jwk) => Some(jwk),
            PublicKeyRef::Address(_) => None,
        }
    }
}

/// A registered key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    /// Unique tag within the project
    pub tag: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub public_key: PublicKeyRef,
    /// Encrypted private material (hex key, private JWK or KMS config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Safe wallet reference (`<chainPrefix>:<address>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multisig: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A DID minted by this project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgIdRecord {
    pub did: String,
    /// Registration salt (0x-prefixed bytes32)
    pub salt: String,
    /// Owner address
    pub owner: String,
    /// Path to the ORG.JSON document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_json: Option<String>,
    /// URI of the deployed ORGiD VC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id_vc: Option<String>,
    /// True once the ORGiD exists on chain
    #[serde(default)]
    pub created: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Config value (network provider URI or API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    pub id: String,
    pub value: String,
    pub encrypted: bool,
    pub created_at: DateTime<Utc>,
}

/// Which config list a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    ApiKeys,
    NetworkProviders,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::ApiKeys => f.write_str("apiKeys"),
            ConfigKind::NetworkProviders => f.write_str("networkProviders"),
        }
    }
}

impl FromStr for ConfigKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apiKeys" | "apisKeys" => Ok(ConfigKind::ApiKeys),
            "networkProviders" => Ok(ConfigKind::NetworkProviders),
            other => Err(format!("Unknown config record type: \"{other}\"")),
        }
    }
}

/// A file published to IPFS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub uri: String,
    /// DID whose ORGiD VC this deployment holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// On-disk shape of the project file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub keys: Vec<KeyRecord>,
    #[serde(default)]
    pub org_ids: Vec<OrgIdRecord>,
    #[serde(default)]
    pub deployments: Vec<DeploymentRecord>,
    #[serde(default)]
    pub api_keys: Vec<ConfigRecord>,
    #[serde(default)]
    pub network_providers: Vec<ConfigRecord>,
}

impl ProjectFile {
    fn config(&self, kind: ConfigKind) -> &Vec<ConfigRecord> {
        match kind {
            ConfigKind::ApiKeys => &self.api_keys,
            ConfigKind::NetworkProviders => &self.network_providers,
        }
    }

    fn config_mut(&mut self, kind: ConfigKind) -> &mut Vec<ConfigRecord> {
        match kind {
            ConfigKind::ApiKeys => &mut self.api_keys,
            ConfigKind::NetworkProviders => &mut self.network_providers,
        }
    }
}

/// Reads and rewrites the project file.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    storage: ProjectStorage,
}

impl ProjectStore {
    pub fn new(paths: ProjectPaths) -> Self {
        Self {
            storage: ProjectStorage::new(paths),
        }
    }

    pub fn storage(&self) -> &ProjectStorage {
        &self.storage
    }

    pub fn paths(&self) -> &ProjectPaths {
        self.storage.paths()
    }

    /// Load the project file. A missing file is an empty project.
    pub fn load(&self) -> StorageResult<ProjectFile> {
        let path = self.paths().project_file();
        if !self.storage.exists(&path) {
            return Ok(ProjectFile::default());
        }
        self.storage.read_json(path)
    }

    /// Rewrite the whole project file.
    pub fn save(&self, project: &ProjectFile) -> StorageResult<()> {
        self.storage.write_json(self.paths().project_file(), project)
    }

    fn update<T>(
        &self,
        apply: impl FnOnce(&mut ProjectFile) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut project = self.load()?;
        let result = apply(&mut project)?;
        self.save(&project)?;
        Ok(result)
    }

    // ========== Keys ==========

    /// Register a key pair. Tags are unique.
    pub fn add_key(&self, record: KeyRecord) -> StorageResult<KeyRecord> {
        self.update(|project| {
            if project.keys.iter().any(|k| k.tag == record.tag) {
                return Err(StorageError::DuplicateTag(record.tag.clone()));
            }
            project.keys.push(record.clone());
            Ok(record)
        })
    }

    /// List keys of the given types (all keys when `types` is empty).
    pub fn keys(&self, types: &[KeyType]) -> StorageResult<Vec<KeyRecord>> {
        Ok(self
            .load()?
            .keys
            .into_iter()
            .filter(|k| types.is_empty() || types.contains(&k.key_type))
            .collect())
    }

    pub fn key_by_tag(&self, tag: &str) -> StorageResult<KeyRecord> {
        self.load()?
            .keys
            .into_iter()
            .find(|k| k.tag == tag)
            .ok_or_else(|| StorageError::NotFound(format!("key pair with tag \"{tag}\"")))
    }

    // ========== ORGiDs ==========

    /// Insert or replace the record for `record.did`.
    pub fn upsert_org_id(&self, record: OrgIdRecord) -> StorageResult<OrgIdRecord> {
        self.update(|project| {
            match project.org_ids.iter_mut().find(|o| o.did == record.did) {
                Some(existing) => *existing = record.clone(),
                None => project.org_ids.push(record.clone()),
            }
            Ok(record)
        })
    }

    /// List ORGiD records, optionally filtered by their `created` flag.
    pub fn org_ids(&self, created: Option<bool>) -> StorageResult<Vec<OrgIdRecord>> {
        Ok(self
            .load()?
            .org_ids
            .into_iter()
            .filter(|o| created.is_none_or(|c| o.created == c))
            .collect())
    }

    pub fn org_id(&self, did: &str) -> StorageResult<OrgIdRecord> {
        self.load()?
            .org_ids
            .into_iter()
            .find(|o| o.did == did)
            .ok_or_else(|| StorageError::NotFound(format!("ORGiD {did} in the project")))
    }

    /// Mutate a stored ORGiD record in place.
    pub fn update_org_id(
        &self,
        did: &str,
        patch: impl FnOnce(&mut OrgIdRecord),
    ) -> StorageResult<OrgIdRecord> {
        self.update(|project| {
            let record = project
                .org_ids
                .iter_mut()
                .find(|o| o.did == did)
                .ok_or_else(|| StorageError::NotFound(format!("ORGiD {did} in the project")))?;
            patch(record);
            record.updated_at = Utc::now();
            Ok(record.clone())
        })
    }

    // ========== Config ==========

    /// Store a config record, replacing one with the same id.
    pub fn add_config_record(
        &self,
        kind: ConfigKind,
        record: ConfigRecord,
    ) -> StorageResult<ConfigRecord> {
        self.update(|project| {
            let records = project.config_mut(kind);
            records.retain(|r| r.id != record.id);
            records.push(record.clone());
            Ok(record)
        })
    }

    pub fn config_record(&self, kind: ConfigKind, id: &str) -> StorageResult<ConfigRecord> {
        self.load()?
            .config(kind)
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{kind} record #{id}")))
    }

    // ========== Deployments ==========

    /// Record a deployment.
    ///
    /// Returns the previous deployment bound to the same DID, which the new
    /// one supersedes and which is dropped from the project.
    pub fn add_deployment(
        &self,
        record: DeploymentRecord,
    ) -> StorageResult<Option<DeploymentRecord>> {
        self.update(|project| {
            let mut superseded = None;
            if let Some(did) = &record.did {
                if let Some(index) = project
                    .deployments
                    .iter()
                    .position(|d| d.did.as_deref() == Some(did.as_str()))
                {
                    superseded = Some(project.deployments.remove(index));
                }
            }
            project.deployments.push(record);
            Ok(superseded)
        })
    }
}
