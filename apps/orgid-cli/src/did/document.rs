// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ORG.JSON documents, ORGiD VCs and DID resolution responses.
//!
//! Only the members this tool reads or writes are typed; everything else in
//! a document is carried through untouched in `extra`.

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::parse::BlockchainAccountId;
use crate::blockchain::OrgIdData;
use crate::storage::Jwk;

pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const VC_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
pub const ORG_VC_CONTEXT: &str =
    "https://raw.githubusercontent.com/windingtree/org.json-schema/feat/new-orgid/src/orgVc.json";
pub const DID_RESOLUTION_CONTEXT: &str = "https://w3id.org/did-resolution/v1";

/// Verification method type for `blockchainAccountId` methods.
pub const RECOVERY_METHOD_TYPE: &str = "EcdsaSecp256k1RecoveryMethod2020";
/// Verification method type for `publicKeyJwk` methods.
pub const JWK_METHOD_TYPE: &str = "JsonWebKey2020";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub controller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerificationMethod {
    pub fn with_account(id: String, controller: String, address: Address, chain_id: &str) -> Self {
        Self {
            id,
            kind: RECOVERY_METHOD_TYPE.to_string(),
            controller,
            blockchain_account_id: Some(BlockchainAccountId::format(address, chain_id)),
            public_key_jwk: None,
            extra: Map::new(),
        }
    }

    pub fn with_jwk(id: String, controller: String, jwk: Jwk) -> Self {
        Self {
            id,
            kind: JWK_METHOD_TYPE.to_string(),
            controller,
            blockchain_account_id: None,
            public_key_jwk: Some(jwk),
            extra: Map::new(),
        }
    }
}

/// Entry of `authentication`, `assertionMethod` or `capabilityDelegation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodRef {
    Id(String),
    Embedded(VerificationMethod),
}

impl MethodRef {
    pub fn id(&self) -> &str {
        match self {
            MethodRef::Id(id) => id,
            MethodRef::Embedded(method) => &method.id,
        }
    }
}

/// ORG.JSON: a DID document describing an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context", default, skip_serializing_if = "Value::is_null")]
    pub context: Value,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<MethodRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<MethodRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<MethodRef>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DidDocument {
    /// Minimal document for a freshly minted DID.
    pub fn new(did: &str) -> Self {
        Self {
            context: Value::from(vec![DID_CONTEXT]),
            id: did.to_string(),
            controller: None,
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
            capability_delegation: None,
            extra: Map::new(),
        }
    }

    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|v| v.id == id)
    }

    /// Add a verification method, replacing one with the same id.
    pub fn upsert_verification_method(&mut self, method: VerificationMethod) {
        match self.verification_method.iter_mut().find(|v| v.id == method.id) {
            Some(existing) => *existing = method,
            None => self.verification_method.push(method),
        }
    }

    /// Add a method id to `capabilityDelegation` (no duplicates).
    pub fn add_capability_delegation(&mut self, id: &str) {
        let delegates = self.capability_delegation.get_or_insert_with(Vec::new);
        if !delegates.iter().any(|d| d.id() == id) {
            delegates.push(MethodRef::Id(id.to_string()));
        }
    }

    /// Ids listed in `capabilityDelegation`, when the member is present.
    pub fn delegate_ids(&self) -> Option<Vec<String>> {
        self.capability_delegation
            .as_ref()
            .map(|delegates| delegates.iter().map(|d| d.id().to_string()).collect())
    }

    /// True when the first delegation entry is a plain id.
    pub fn is_delegated(&self) -> bool {
        matches!(
            self.capability_delegation.as_deref(),
            Some([MethodRef::Id(_), ..])
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub kind: String,
    pub created: DateTime<Utc>,
    pub proof_purpose: String,
    pub verification_method: String,
    pub jws: String,
}

/// ORGiD VC: a verifiable credential wrapping an ORG.JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgIdVc {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    pub issuer: String,
    pub issuance_date: DateTime<Utc>,
    pub credential_subject: DidDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// `didResolutionMetadata` of a resolution response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub retrieved: DateTime<Utc>,
    /// Resolution time in milliseconds
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `didDocumentMetadata` of a resolution response.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<OrgIdData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DidResolutionResponse {
    #[serde(rename = "@context")]
    pub context: &'static str,
    pub did: String,
    pub did_document: Option<DidDocument>,
    pub did_resolution_metadata: ResolutionMetadata,
    pub did_document_metadata: DocumentMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DID: &str = "did:orgid:5:0x7d00a5a3ca0d4b3a0e3c4c3a2dbcc2d7c0bb0d6f2fc2a39f0ad1e3e0fa5b2c1e";

    #[test]
    fn unknown_members_survive_round_trip() {
        let raw = json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": DID,
            "legalEntity": { "legalName": "Acme" },
            "verificationMethod": [{
                "id": format!("{DID}#key1"),
                "type": RECOVERY_METHOD_TYPE,
                "controller": DID,
                "blockchainAccountId": "0x0000000000000000000000000000000000000001@eip155:5",
                "note": "kept"
            }]
        });

        let document: DidDocument = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(document.extra["legalEntity"]["legalName"], "Acme");
        assert_eq!(
            document.verification_method(&format!("{DID}#key1")).unwrap().extra["note"],
            "kept"
        );
        assert_eq!(serde_json::to_value(&document).unwrap(), raw);
    }

    #[test]
    fn upsert_replaces_same_id() {
        let mut document = DidDocument::new(DID);
        let id = format!("{DID}#k1");
        document.upsert_verification_method(VerificationMethod::with_account(
            id.clone(),
            DID.to_string(),
            Address::repeat_byte(1),
            "5",
        ));
        document.upsert_verification_method(VerificationMethod::with_account(
            id.clone(),
            DID.to_string(),
            Address::repeat_byte(2),
            "5",
        ));

        assert_eq!(document.verification_method.len(), 1);
        assert!(document.verification_method[0]
            .blockchain_account_id
            .as_deref()
            .unwrap()
            .starts_with(&Address::repeat_byte(2).to_string()));
    }

    #[test]
    fn delegation_helpers() {
        let mut document = DidDocument::new(DID);
        assert!(!document.is_delegated());
        assert!(document.delegate_ids().is_none());

        document.add_capability_delegation("did:orgid:5:0xabc#k1");
        document.add_capability_delegation("did:orgid:5:0xabc#k1");

        assert!(document.is_delegated());
        assert_eq!(document.delegate_ids().unwrap(), vec!["did:orgid:5:0xabc#k1"]);
    }

    #[test]
    fn embedded_delegates_are_normalized_to_ids() {
        let raw = json!({
            "id": DID,
            "capabilityDelegation": [{
                "id": "did:orgid:5:0xabc#k2",
                "type": JWK_METHOD_TYPE,
                "controller": DID
            }]
        });
        let document: DidDocument = serde_json::from_value(raw).unwrap();
        assert!(!document.is_delegated());
        assert_eq!(document.delegate_ids().unwrap(), vec!["did:orgid:5:0xabc#k2"]);
    }
}
