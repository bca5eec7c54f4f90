// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation transfer`: hand the ORGiD token to a new owner.

use std::str::FromStr;

use alloy::primitives::{Address, U256};

use super::{ensure_owner, print_object, report, Context, OrgTarget, PlannedCall, Submitted};
use crate::blockchain::registry::transfer_call;
use crate::cli::Args;
use crate::error::{CliError, CliResult};
use crate::storage::{KeyType, OrgIdRecord};

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let record = ctx.select_org_id(args.did.as_deref(), Some(true))?;
    if !record.created {
        return Err(CliError::invalid_input(format!(
            "ORGiD {} is not created yet",
            record.did
        )));
    }
    let target = OrgTarget::of(&record)?;

    let new_owner = match args.new_owner.as_deref() {
        Some(address) => address.to_string(),
        None => ctx.prompt.text("Please enter the address of the new owner")?,
    };
    let new_owner = Address::from_str(new_owner.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid new owner address \"{new_owner}\"")))?;

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
    let owner = ensure_owner(&record.owner, &key)?;
    if owner == new_owner {
        return Err(CliError::invalid_input(format!(
            "{new_owner} already owns {}",
            record.did
        )));
    }

    let token_id = token_id(ctx, &record, &target).await?;
    let call = transfer_call(target.network.registry, owner, new_owner, token_id);

    match ctx
        .submit(&record.did, target.network, &key, &[PlannedCall::from(call)])
        .await?
    {
        Submitted::Proposed { nonces } => {
            tracing::info!(did = %record.did, ?nonces, "ORGiD transfer proposed");
            report(format!(
                "Transfer of {} to {new_owner} has been proposed to the multisig (nonces {nonces:?})",
                record.did
            ));
        }
        Submitted::Broadcast { .. } => {
            let updated = ctx.store.update_org_id(&record.did, |r| {
                r.owner = new_owner.to_checksum(None);
                r.token_id = Some(token_id.to_string());
            })?;
            tracing::info!(did = %record.did, from = %owner, to = %new_owner, "ORGiD transferred");
            report(format!(
                "ORGiD {} has been transferred to {new_owner}",
                record.did
            ));
            print_object(&updated)?;
        }
    }

    Ok(())
}

/// Stored token id, or the registry's when the record has none yet.
async fn token_id(ctx: &Context<'_>, record: &OrgIdRecord, target: &OrgTarget) -> CliResult<U256> {
    let raw = match &record.token_id {
        Some(token_id) => token_id.clone(),
        None => {
            let client = ctx.chain_client(&target.parsed.network)?;
            client
                .get_org_id(target.parsed.org_id)
                .await?
                .ok_or_else(|| CliError::not_found(format!("ORGiD {}", target.parsed.org_id)))?
                .token_id
        }
    };
    U256::from_str(&raw).map_err(|_| CliError::invalid_input(format!("Invalid token id \"{raw}\"")))
}
