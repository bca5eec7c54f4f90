// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation keys:import`: register a key pair in the project.
//!
//! With `--addToOrgId true` the key also becomes a verification method
//! `<did>#<tag>` of a project ORG.JSON (`--isDelegated true` additionally
//! lists it in `capabilityDelegation`).

use std::str::FromStr;

use alloy::primitives::Address;
use chrono::Utc;

use super::{config, flag_enabled, report, Context};
use crate::cli::Args;
use crate::crypto;
use crate::did::{parse_did, DidDocument, VerificationMethod};
use crate::error::{CliError, CliResult};
use crate::keys::{parse_private_key, AwsKms, AwsKmsConfig, KmsSigner, PemKey};
use crate::safe::SafeAddress;
use crate::storage::{ConfigKind, KeyRecord, KeyType, PublicKeyRef};

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let key_type = args.key_type.as_deref().ok_or_else(|| {
        CliError::configuration("Key pair type must be provided using \"--keyType\" option")
    })?;

    if key_type == "api" {
        config::add_record(ctx, ConfigKind::ApiKeys)?;
        return Ok(());
    }

    let key_type = KeyType::from_str(key_type).map_err(CliError::Configuration)?;
    let record = match key_type {
        KeyType::Ethereum => import_ethereum(ctx)?,
        KeyType::Pem => import_pem(args, ctx)?,
        KeyType::KmsEthereum => import_kms(ctx).await?,
        KeyType::Multisig => import_multisig(ctx)?,
    };

    let record = ctx.store.add_key(record)?;
    tracing::info!(tag = %record.tag, key_type = %record.key_type, "Key pair imported");
    report(format!(
        "Key pair of type \"{}\" with tag \"{}\" has been successfully imported",
        record.key_type, record.tag
    ));

    if flag_enabled(args.add_to_org_id.as_deref()) {
        add_to_org_json(args, ctx, &record)?;
    }

    Ok(())
}

fn prompt_tag(ctx: &Context<'_>) -> CliResult<String> {
    let tag = ctx.prompt.text("Please enter an unique key tag")?;
    if tag.is_empty() || tag.contains(['#', ' ']) {
        return Err(CliError::invalid_input(format!("Invalid key tag \"{tag}\"")));
    }
    Ok(tag)
}

fn import_ethereum(ctx: &Context<'_>) -> CliResult<KeyRecord> {
    let tag = prompt_tag(ctx)?;

    let account = ctx.prompt.text("Please enter an Ethereum account address")?;
    let account = Address::from_str(&account)
        .map_err(|_| CliError::invalid_input("Value must be a valid Ethereum address"))?;

    let private_key = ctx
        .prompt
        .password("Please enter a private key for the Ethereum account")?;
    let signer = parse_private_key(&private_key)?;
    if signer.address() != account {
        return Err(CliError::invalid_input(format!(
            "The private key does not belong to the account {}",
            account.to_checksum(None)
        )));
    }

    let passphrase = ctx.new_passphrase()?;

    Ok(KeyRecord {
        tag,
        key_type: KeyType::Ethereum,
        public_key: PublicKeyRef::Address(account.to_checksum(None)),
        private_key: Some(crypto::encrypt(private_key.trim(), &passphrase)?),
        multisig: None,
        created_at: Utc::now(),
    })
}

fn import_pem(args: &Args, ctx: &Context<'_>) -> CliResult<KeyRecord> {
    let (Some(public_path), Some(private_path)) = (args.pub_pem.as_deref(), args.priv_pem.as_deref())
    else {
        return Err(CliError::configuration(
            "Both paths to pem-formatted keys must be provided using \"--pubPem\" and \"--privPem\" options",
        ));
    };

    let tag = prompt_tag(ctx)?;

    let storage = ctx.store.storage();
    let public_pem = storage.read_text(ctx.paths().resolve(public_path))?;
    let private_pem = storage.read_text(ctx.paths().resolve(private_path))?;
    let key = PemKey::from_pem_pair(&public_pem, &private_pem)?;

    let passphrase = ctx.new_passphrase()?;

    Ok(KeyRecord {
        tag,
        key_type: KeyType::Pem,
        public_key: PublicKeyRef::Jwk(key.public_jwk()?),
        private_key: Some(crypto::encrypt(&key.private_jwk_json(), &passphrase)?),
        multisig: None,
        created_at: Utc::now(),
    })
}

async fn import_kms(ctx: &Context<'_>) -> CliResult<KeyRecord> {
    let tag = prompt_tag(ctx)?;

    let key_id = ctx.prompt.text("Please enter the AWS KMS key Id")?;
    let region = ctx.prompt.text("Please enter the AWS region of the key")?;
    if key_id.is_empty() || region.is_empty() {
        return Err(CliError::invalid_input("Both the KMS key Id and region must be provided"));
    }

    let (access_key_id, secret_access_key) = if ctx
        .prompt
        .confirm("Do you want to store explicit AWS credentials for this key?")?
    {
        (
            Some(ctx.prompt.text("Please enter the AWS access key Id")?),
            Some(ctx.prompt.password("Please enter the AWS secret access key")?),
        )
    } else {
        (None, None)
    };

    let config = AwsKmsConfig {
        key_id,
        region,
        access_key_id,
        secret_access_key,
    };

    let signer = KmsSigner::connect(AwsKms::new(&config).await).await?;
    report(format!(
        "KMS key resolves to the account {}",
        signer.address().to_checksum(None)
    ));

    let passphrase = ctx.new_passphrase()?;
    let serialized = serde_json::to_string(&config)?;

    Ok(KeyRecord {
        tag,
        key_type: KeyType::KmsEthereum,
        public_key: PublicKeyRef::Address(signer.address().to_checksum(None)),
        private_key: Some(crypto::encrypt(&serialized, &passphrase)?),
        multisig: None,
        created_at: Utc::now(),
    })
}

fn import_multisig(ctx: &Context<'_>) -> CliResult<KeyRecord> {
    let tag = prompt_tag(ctx)?;

    let reference = ctx
        .prompt
        .text("Please enter Safe wallet address (with net prefix)")?;
    let safe = SafeAddress::from_str(&reference)?;

    Ok(KeyRecord {
        tag,
        key_type: KeyType::Multisig,
        public_key: PublicKeyRef::Address(safe.address.to_checksum(None)),
        private_key: None,
        multisig: Some(safe.to_string()),
        created_at: Utc::now(),
    })
}

/// Add `record` as a verification method of a project ORG.JSON.
pub fn add_to_org_json(args: &Args, ctx: &Context<'_>, record: &KeyRecord) -> CliResult<()> {
    let org_id = ctx.select_org_id(args.did.as_deref(), None)?;
    let org_json = org_id.org_json.as_deref().ok_or_else(|| {
        CliError::not_found(format!("Link to the ORG.JSON file for {}", org_id.did))
    })?;
    let org_json_path = ctx.paths().resolve(org_json);

    let mut document: DidDocument = ctx.store.storage().read_json(&org_json_path)?;

    let controller = args.controller.clone().unwrap_or_else(|| org_id.did.clone());
    let parsed_controller = parse_did(&controller)?;

    let method_id = format!("{}#{}", org_id.did, record.tag);
    let method = match record.key_type {
        KeyType::Ethereum | KeyType::KmsEthereum => {
            let address = record
                .public_key
                .as_address()
                .and_then(|a| Address::from_str(a).ok())
                .ok_or_else(|| {
                    CliError::invalid_input(format!("Key pair \"{}\" has no address", record.tag))
                })?;
            VerificationMethod::with_account(
                method_id.clone(),
                controller,
                address,
                &parsed_controller.network,
            )
        }
        KeyType::Pem => {
            let jwk = record.public_key.as_jwk().cloned().ok_or_else(|| {
                CliError::invalid_input(format!("Key pair \"{}\" has no public JWK", record.tag))
            })?;
            VerificationMethod::with_jwk(method_id.clone(), controller, jwk)
        }
        KeyType::Multisig => {
            return Err(CliError::invalid_input(
                "It is not possible to create verification method using \"multisig\" type of key",
            ))
        }
    };

    document.upsert_verification_method(method);
    if flag_enabled(args.is_delegated.as_deref()) {
        document.add_capability_delegation(&method_id);
    }

    ctx.store.storage().write_json(&org_json_path, &document)?;
    ctx.store.update_org_id(&org_id.did, |_| {})?;

    report(format!(
        "\"verificationMethod\" with Id {method_id} has been added.\n\
         ORG.JSON file for {} has been successfully updated in the project.",
        org_id.did
    ));
    Ok(())
}
