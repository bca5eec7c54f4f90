// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation bootstrap`: mint a DID locally and write its ORG.JSON template.

use std::str::FromStr;

use alloy::primitives::{Address, B256};
use chrono::Utc;
use k256::elliptic_curve::rand_core::{OsRng, RngCore};

use super::{print_object, report, Context};
use crate::blockchain::{org_id_from_salt, SUPPORTED_NETWORKS};
use crate::cli::Args;
use crate::did::{DidDocument, ParsedDid, VerificationMethod};
use crate::error::{CliError, CliResult};
use crate::safe::SafeAddress;
use crate::storage::{KeyRecord, KeyType, OrgIdRecord};

pub fn run(args: &Args, ctx: &Context<'_>) -> CliResult<OrgIdRecord> {
    let key = ctx.select_key(
        &[KeyType::Ethereum, KeyType::KmsEthereum, KeyType::Multisig],
        "Choose the ORGiD owner key",
    )?;
    let owner = owner_address(&key)?;

    let choices: Vec<String> = SUPPORTED_NETWORKS
        .iter()
        .map(|n| format!("{} (#{})", n.name, n.chain_id))
        .collect();
    let network = SUPPORTED_NETWORKS
        .get(ctx.prompt.select("Choose a network", &choices)?)
        .ok_or_else(|| CliError::invalid_input("Network not selected"))?;

    let mut salt = B256::ZERO;
    OsRng.fill_bytes(salt.as_mut_slice());

    let org_id = org_id_from_salt(owner, salt);
    let did = ParsedDid::build(&network.chain_id.to_string(), org_id);

    let mut document = DidDocument::new(&did);
    if key.key_type != KeyType::Multisig {
        document.upsert_verification_method(VerificationMethod::with_account(
            format!("{did}#{}", key.tag),
            did.clone(),
            owner,
            &network.chain_id.to_string(),
        ));
    }

    let org_json = match args.output.as_deref() {
        Some(output) => output.to_string(),
        None => {
            let path = ctx.paths().org_json(&org_id.to_string());
            path.strip_prefix(ctx.paths().root())
                .unwrap_or(&path)
                .display()
                .to_string()
        }
    };
    ctx.store
        .storage()
        .write_json(ctx.paths().resolve(&org_json), &document)?;

    let now = Utc::now();
    let record = ctx.store.upsert_org_id(OrgIdRecord {
        did: did.clone(),
        salt: salt.to_string(),
        owner: owner.to_checksum(None),
        org_json: Some(org_json.clone()),
        org_id_vc: None,
        created: false,
        tx_hash: None,
        token_id: None,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(%did, network = network.chain_id, owner = %owner, "ORGiD bootstrapped");
    report(format!(
        "ORG.JSON template for {did} has been saved to {org_json}"
    ));
    print_object(&record)?;

    Ok(record)
}

fn owner_address(key: &KeyRecord) -> CliResult<Address> {
    match key.key_type {
        KeyType::Multisig => {
            let reference = key.multisig.as_deref().ok_or_else(|| {
                CliError::invalid_input(format!("Multisig \"{}\" has no Safe reference", key.tag))
            })?;
            Ok(SafeAddress::from_str(reference)?.address)
        }
        _ => key
            .public_key
            .as_address()
            .and_then(|a| Address::from_str(a).ok())
            .ok_or_else(|| {
                CliError::invalid_input(format!("Key pair \"{}\" has no address", key.tag))
            }),
    }
}
