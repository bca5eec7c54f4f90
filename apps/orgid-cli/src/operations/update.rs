// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation update`: point a registered ORGiD at its current VC.

use super::{ensure_owner, print_object, report, Context, OrgTarget, PlannedCall, Submitted};
use crate::blockchain::registry::{add_delegates_call, set_org_json_call};
use crate::cli::Args;
use crate::did::OrgIdVc;
use crate::error::{CliError, CliResult};
use crate::storage::KeyType;

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let record = ctx.select_org_id(args.did.as_deref(), Some(true))?;
    if !record.created {
        return Err(CliError::invalid_input(format!(
            "ORGiD {} is not created yet. Use \"--operation create\"",
            record.did
        )));
    }

    let vc_uri = record.org_id_vc.clone().ok_or_else(|| {
        CliError::configuration(format!("ORGiD VC for {} is not found", record.did))
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

    let mut calls = Vec::with_capacity(2);
    let delegates = vc.credential_subject.delegate_ids().unwrap_or_default();
    if !delegates.is_empty() {
        calls.push(PlannedCall::from(add_delegates_call(
            registry,
            target.parsed.org_id,
            delegates,
        )));
    }
    calls.push(PlannedCall::from(set_org_json_call(
        registry,
        target.parsed.org_id,
        &vc_uri,
    )));

    match ctx.submit(&record.did, target.network, &key, &calls).await? {
        Submitted::Proposed { nonces } => {
            tracing::info!(did = %record.did, ?nonces, "ORGiD update proposed");
            report(format!(
                "ORGiD update for {} has been proposed to the multisig (nonces {nonces:?})",
                record.did
            ));
        }
        Submitted::Broadcast { client, .. } => {
            let data = client
                .get_org_id(target.parsed.org_id)
                .await?
                .ok_or_else(|| CliError::not_found(format!("ORGiD {}", target.parsed.org_id)))?;
            tracing::info!(did = %record.did, uri = %data.org_json_uri, "ORGiD updated");
            report(format!("ORGiD {} has been successfully updated", record.did));
            print_object(&data)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::did::document::VC_CONTEXT;
    use crate::did::DidDocument;
    use crate::operations::testing::{
        add_ethereum_key, add_org_id, address_of, settings, DID, OTHER_KEY, OWNER_KEY,
    };
    use crate::prompt::scripted::ScriptedPrompter;

    #[tokio::test]
    async fn signer_other_than_owner_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new(["k1 (ethereum)", "Abcdef12"]);
        let ctx = Context::new(settings(&dir), &prompt);
        add_ethereum_key(&ctx, "k1", OTHER_KEY, "Abcdef12");
        add_org_id(&ctx, address_of(OWNER_KEY), true, Some("org.vc.json"));

        let vc = OrgIdVc {
            context: vec![VC_CONTEXT.to_string()],
            id: "urn:uuid:1".to_string(),
            kind: vec!["VerifiableCredential".to_string()],
            issuer: format!("{DID}#k1"),
            issuance_date: Utc::now(),
            credential_subject: DidDocument::new(DID),
            name: None,
            description: None,
            image: None,
            proof: None,
        };
        ctx.store
            .storage()
            .write_json(ctx.paths().resolve("org.vc.json"), &vc)
            .unwrap();

        let args = Args {
            did: Some(DID.to_string()),
            ..Default::default()
        };
        let error = run(&args, &ctx).await.unwrap_err();
        assert!(matches!(
            error,
            CliError::OwnershipMismatch { ref actual, .. } if *actual == address_of(OTHER_KEY).to_checksum(None)
        ));

        // No provider is configured, so reaching submission would have
        // failed with a configuration error instead.
        assert_eq!(prompt.remaining(), 0);
        assert!(ctx.store.org_id(DID).unwrap().tx_hash.is_none());
    }

    #[tokio::test]
    async fn requires_created_org_id() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);
        add_org_id(&ctx, address_of(OWNER_KEY), false, Some("org.vc.json"));

        let args = Args {
            did: Some(DID.to_string()),
            ..Default::default()
        };
        assert!(matches!(run(&args, &ctx).await, Err(CliError::InvalidInput(_))));

        assert!(matches!(
            run(&Args::default(), &ctx).await,
            Err(CliError::NotFound(_))
        ));
    }
}
