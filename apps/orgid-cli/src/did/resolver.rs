// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DID resolution against the ORGiD registry.
//!
//! Resolution never fails as a call: problems are reported in
//! `didResolutionMetadata.error` with a `null` document.

use std::time::Instant;

use chrono::Utc;

use super::document::{
    DidDocument, DidResolutionResponse, DocumentMetadata, OrgIdVc, ResolutionMetadata,
    DID_RESOLUTION_CONTEXT,
};
use super::parse::parse_did;
use super::DidError;
use crate::blockchain::{OrgIdClient, OrgIdData};
use crate::ipfs::IpfsClient;

const CONTENT_TYPE: &str = "application/did+ld+json";

/// Something that turns a DID into a resolution response.
#[allow(async_fn_in_trait)]
pub trait DidResolver {
    async fn resolve(&self, did: &str) -> DidResolutionResponse;
}

/// Resolver reading the registry of one network and fetching VCs over IPFS/HTTP.
pub struct OrgIdResolver {
    client: OrgIdClient,
    ipfs: IpfsClient,
}

impl OrgIdResolver {
    pub fn new(client: OrgIdClient, ipfs: IpfsClient) -> Self {
        Self { client, ipfs }
    }

    async fn lookup(&self, did: &str) -> Result<(DidDocument, OrgIdData), String> {
        let parsed = parse_did(did).map_err(|e| e.to_string())?;

        let network = self.client.network();
        if parsed.network != network.chain_id.to_string() {
            return Err(format!(
                "DID network #{} does not match the resolver network #{}",
                parsed.network, network.chain_id
            ));
        }

        let data = self
            .client
            .get_org_id(parsed.org_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("ORGiD {} not found", parsed.org_id))?;

        if data.org_json_uri.is_empty() {
            return Err("ORGiD has no ORG.JSON URI".to_string());
        }

        let vc: OrgIdVc = self
            .ipfs
            .fetch_json(&data.org_json_uri)
            .await
            .map_err(|e| e.to_string())?;

        let document = document_from_vc(&parsed.did, vc).map_err(|e| e.to_string())?;
        Ok((document, data))
    }
}

impl DidResolver for OrgIdResolver {
    async fn resolve(&self, did: &str) -> DidResolutionResponse {
        let started = Instant::now();
        let outcome = self.lookup(did).await;
        if let Err(error) = &outcome {
            tracing::debug!(did, %error, "DID resolution failed");
        }
        resolution_response(did, started, outcome)
    }
}

/// Extract the ORG.JSON from a VC, checking it describes `did`.
pub fn document_from_vc(did: &str, vc: OrgIdVc) -> Result<DidDocument, DidError> {
    if !vc.kind.iter().any(|k| k == "VerifiableCredential") {
        return Err(DidError::InvalidDocument(
            "not a verifiable credential".to_string(),
        ));
    }

    let subject = vc.credential_subject;
    if subject.id != did {
        return Err(DidError::InvalidDocument(format!(
            "credential subject {} does not match {did}",
            subject.id
        )));
    }

    Ok(subject)
}

/// Wrap a lookup outcome into a resolution response.
pub fn resolution_response(
    did: &str,
    started: Instant,
    outcome: Result<(DidDocument, OrgIdData), String>,
) -> DidResolutionResponse {
    let duration = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (document, data, error, content_type) = match outcome {
        Ok((document, data)) => (Some(document), Some(data), None, Some(CONTENT_TYPE.to_string())),
        Err(error) => (None, None, Some(error), None),
    };

    DidResolutionResponse {
        context: DID_RESOLUTION_CONTEXT,
        did: did.to_string(),
        did_document: document,
        did_resolution_metadata: ResolutionMetadata {
            content_type,
            retrieved: Utc::now(),
            duration,
            error,
        },
        did_document_metadata: DocumentMetadata { data },
    }
}
