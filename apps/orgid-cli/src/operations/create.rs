// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation create`: register a bootstrapped ORGiD in the registry.

use super::{ensure_owner, print_object, report, Context, OrgTarget, PlannedCall, Submitted};
use crate::blockchain::registry::{add_delegates_call, create_org_id_call};
use crate::cli::Args;
use crate::did::OrgIdVc;
use crate::error::{CliError, CliResult};
use crate::keys::KeyPair;
use crate::storage::KeyType;

/// `safeTxGas` for the delegates proposal that follows a multisig create;
/// it cannot be estimated before the ORGiD exists.
const DELEGATES_SAFE_TX_GAS: &str = "179545";

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let record = ctx.select_org_id(args.did.as_deref(), Some(false))?;
    if record.created {
        return Err(CliError::invalid_input(format!(
            "ORGiD {} is already created",
            record.did
        )));
    }

    let vc_uri = record.org_id_vc.clone().ok_or_else(|| {
        CliError::configuration(format!(
            "ORGiD VC for {} is not found. Create it with \"--operation orgIdVc\" and deploy it first",
            record.did
        ))
    })?;
    let vc: OrgIdVc = ctx.read_document(&vc_uri).await?;
    let target = OrgTarget::of(&record)?;
    let registry = target.network.registry;

    let key_record = ctx.select_key(
        &[
            KeyType::Ethereum,
            KeyType::Pem,
            KeyType::KmsEthereum,
            KeyType::Multisig,
        ],
        "Choose the ORGiD owner key",
    )?;
    let key = ctx.unlock_key(&key_record).await?;
    ensure_owner(&record.owner, &key)?;

    let mut calls = vec![PlannedCall::from(create_org_id_call(
        registry,
        target.salt,
        &vc_uri,
    ))];
    if matches!(key, KeyPair::Multisig(_)) && vc.credential_subject.is_delegated() {
        let delegates = vc.credential_subject.delegate_ids().unwrap_or_default();
        calls.push(PlannedCall {
            call: add_delegates_call(registry, target.parsed.org_id, delegates),
            safe_tx_gas: Some(DELEGATES_SAFE_TX_GAS),
        });
    }

    match ctx.submit(&record.did, target.network, &key, &calls).await? {
        Submitted::Proposed { nonces } => {
            let updated = ctx.store.update_org_id(&record.did, |r| r.created = true)?;
            tracing::info!(did = %record.did, ?nonces, "ORGiD creation proposed");
            report(format!(
                "ORGiD creation for {} has been proposed to the multisig (nonces {nonces:?}). \
                 It is registered once the owners execute the proposal",
                record.did
            ));
            print_object(&updated)?;
        }
        Submitted::Broadcast { client, receipts } => {
            let data = client
                .get_org_id(target.parsed.org_id)
                .await?
                .ok_or_else(|| CliError::not_found(format!("ORGiD {}", target.parsed.org_id)))?;

            ctx.store.update_org_id(&record.did, |r| {
                r.created = true;
                r.token_id = Some(data.token_id.clone());
            })?;
            tracing::info!(
                did = %record.did,
                token_id = %data.token_id,
                txs = receipts.len(),
                "ORGiD created"
            );
            report(format!("ORGiD {} has been successfully created", record.did));
            print_object(&data)?;
        }
    }

    Ok(())
}
