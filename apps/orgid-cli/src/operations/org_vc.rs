// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation orgIdVc`: wrap an ORG.JSON into a signed ORGiD VC.

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use super::{deploy, print_object, report, Context};
use crate::auth::sign_detached;
use crate::cli::Args;
use crate::did::document::{ORG_VC_CONTEXT, VC_CONTEXT};
use crate::did::{DidDocument, OrgIdVc, Proof};
use crate::error::{CliError, CliResult};
use crate::storage::{KeyRecord, KeyType};

const PROOF_TYPE: &str = "EcdsaSecp256k1Signature2019";
const PROOF_PURPOSE: &str = "assertionMethod";

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let record = ctx.select_org_id(args.did.as_deref(), None)?;
    let org_json = record.org_json.as_deref().ok_or_else(|| {
        CliError::configuration(format!(
            "ORG.JSON for {} is not defined. Run \"--operation bootstrap\" first",
            record.did
        ))
    })?;
    let org_json_path = ctx.paths().resolve(org_json);
    let document: DidDocument = ctx.store.storage().read_json(&org_json_path)?;

    if document.id != record.did {
        return Err(CliError::invalid_input(format!(
            "ORG.JSON at {org_json} describes {} instead of {}",
            document.id, record.did
        )));
    }

    let key_record = select_signer(ctx, &document)?;
    let verification_method = format!("{}#{}", record.did, key_record.tag);
    let key = ctx.unlock_key(&key_record).await?;

    let mut vc = OrgIdVc {
        context: vec![VC_CONTEXT.to_string(), ORG_VC_CONTEXT.to_string()],
        id: format!("urn:uuid:{}", Uuid::new_v4()),
        kind: vec!["VerifiableCredential".to_string(), "OrgJson".to_string()],
        issuer: verification_method.clone(),
        issuance_date: Utc::now(),
        credential_subject: document,
        name: args.nft_name.clone(),
        description: args.nft_description.clone(),
        image: args.nft_image.clone(),
        proof: None,
    };

    let payload = serde_json::to_vec(&vc)?;
    let jws = sign_detached(&key, &payload).await?;
    vc.proof = Some(Proof {
        kind: PROOF_TYPE.to_string(),
        created: Utc::now(),
        proof_purpose: PROOF_PURPOSE.to_string(),
        verification_method,
        jws,
    });

    let output = match args.output.as_deref() {
        Some(output) => output.to_string(),
        None => relative_to_root(ctx, &ctx.paths().org_id_vc(&org_json_path)),
    };
    ctx.store
        .storage()
        .write_json(ctx.paths().resolve(&output), &vc)?;
    ctx.store
        .update_org_id(&record.did, |r| r.org_id_vc = Some(output.clone()))?;

    tracing::info!(did = %record.did, vc = %vc.id, %output, "ORGiD VC signed");
    report(format!("ORGiD VC has been saved to {output}"));

    match args.deploy.as_deref() {
        Some("ipfs") => {
            deploy::deploy_file(ctx, &output, Some(&record.did)).await?;
        }
        Some(other) => {
            return Err(CliError::configuration(format!(
                "Unknown deployment target \"{other}\""
            )))
        }
        None => print_object(&vc)?,
    }

    Ok(())
}

/// Keys that have a verification method in `document`.
fn select_signer(ctx: &Context<'_>, document: &DidDocument) -> CliResult<KeyRecord> {
    let candidates: Vec<KeyRecord> = ctx
        .store
        .keys(&[KeyType::Ethereum, KeyType::Pem, KeyType::KmsEthereum])?
        .into_iter()
        .filter(|k| {
            document
                .verification_method(&format!("{}#{}", document.id, k.tag))
                .is_some()
        })
        .collect();

    if candidates.is_empty() {
        return Err(CliError::not_found(format!(
            "Key pair registered as a verification method of {}",
            document.id
        )));
    }

    let choices: Vec<String> = candidates
        .iter()
        .map(|k| format!("{} ({})", k.tag, k.key_type))
        .collect();
    let index = ctx.prompt.select("Choose a key for the VC proof", &choices)?;
    candidates
        .into_iter()
        .nth(index)
        .ok_or_else(|| CliError::invalid_input("Key pair not selected"))
}

fn relative_to_root(ctx: &Context<'_>, path: &Path) -> String {
    path.strip_prefix(ctx.paths().root())
        .unwrap_or(path)
        .display()
        .to_string()
}
