// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation jwt`: issue an auth token signed by an ORGiD verification method.

use std::str::FromStr;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};

use super::resolve::resolver_for;
use super::{report, Context};
use crate::auth::{create_auth_jwt, parse_scope, AuthClaims};
use crate::cli::Args;
use crate::did::{parse_blockchain_account_id, parse_did, DidResolver, VerificationMethod};
use crate::error::{CliError, CliResult};
use crate::keys::{parse_private_key, KeyPair};
use crate::storage::{Jwk, KeyRecord, KeyType};

/// Validated `--issuer`, `--audience`, `--scope` and `--expiration`.
struct TokenRequest {
    issuer: String,
    did: String,
    audience: String,
    scope: Option<Vec<String>>,
    expiration: Option<DateTime<Utc>>,
}

impl TokenRequest {
    fn from_args(args: &Args, now: DateTime<Utc>) -> CliResult<Self> {
        let issuer = args.issuer.as_deref().ok_or_else(|| {
            CliError::configuration("Token issuer must be provided using \"--issuer\" option")
        })?;
        let audience = args.audience.as_deref().ok_or_else(|| {
            CliError::configuration("Token audience must be provided using \"--audience\" option")
        })?;

        let parsed = parse_did(issuer)?;
        if parsed.fragment.is_none() {
            return Err(CliError::invalid_input(format!(
                "Issuer \"{issuer}\" must be a DID URL with a verification method fragment"
            )));
        }

        let expiration = args
            .expiration
            .as_deref()
            .map(|raw| parse_expiration(raw, now))
            .transpose()?;

        Ok(Self {
            issuer: issuer.to_string(),
            did: parsed.did,
            audience: audience.to_string(),
            scope: args.scope.as_deref().and_then(parse_scope),
            expiration,
        })
    }
}

/// Unix epoch in milliseconds, strictly after `now`.
fn parse_expiration(raw: &str, now: DateTime<Utc>) -> CliResult<DateTime<Utc>> {
    let expiration = raw
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| CliError::invalid_input(format!("Invalid expiration time \"{raw}\"")))?;

    if expiration <= now {
        return Err(CliError::invalid_input(format!(
            "Expiration time {expiration} is in the past"
        )));
    }
    Ok(expiration)
}

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<String> {
    let request = TokenRequest::from_args(args, Utc::now())?;
    let resolver = resolver_for(ctx, &request.did)?;
    issue(&request, ctx, &resolver).await
}

async fn issue<R: DidResolver>(
    request: &TokenRequest,
    ctx: &Context<'_>,
    resolver: &R,
) -> CliResult<String> {
    let response = resolver.resolve(&request.did).await;
    let document = response.did_document.ok_or_else(|| {
        CliError::not_found(format!(
            "DID document of {} ({})",
            request.did,
            response
                .did_resolution_metadata
                .error
                .as_deref()
                .unwrap_or("no document")
        ))
    })?;
    let method = document
        .verification_method(&request.issuer)
        .cloned()
        .ok_or_else(|| CliError::not_found(format!("Verification method {}", request.issuer)))?;

    let key = signer_for(ctx, &method).await?;

    let claims = AuthClaims::new(
        &request.issuer,
        &request.audience,
        request.scope.clone(),
        request.expiration,
        Utc::now(),
    );
    let token = create_auth_jwt(&key, &claims).await?;

    tracing::info!(issuer = %request.issuer, audience = %request.audience, exp = claims.exp, "Auth token issued");
    report(format!("Token issued by {}", request.issuer));
    println!("{token}");

    Ok(token)
}

/// Unlock the local key behind a verification method.
async fn signer_for(ctx: &Context<'_>, method: &VerificationMethod) -> CliResult<KeyPair> {
    if let Some(account) = &method.blockchain_account_id {
        let account = parse_blockchain_account_id(account)?;
        let key = account_key(ctx, account.address).await?;
        if key.address() != account.address {
            return Err(CliError::OwnershipMismatch {
                expected: account.address.to_checksum(None),
                actual: key.address().to_checksum(None),
            });
        }
        return Ok(key);
    }

    if let Some(jwk) = &method.public_key_jwk {
        let record = ctx
            .store
            .keys(&[KeyType::Pem])?
            .into_iter()
            .find(|k| k.public_key.as_jwk().is_some_and(|stored| same_public_jwk(stored, jwk)))
            .ok_or_else(|| {
                CliError::not_found(format!("Pem key pair matching {}", method.id))
            })?;
        return ctx.unlock_key(&record).await;
    }

    Err(CliError::invalid_input(format!(
        "Verification method {} has neither blockchainAccountId nor publicKeyJwk",
        method.id
    )))
}

async fn account_key(ctx: &Context<'_>, address: Address) -> CliResult<KeyPair> {
    let registered: Option<KeyRecord> = ctx
        .store
        .keys(&[KeyType::Ethereum, KeyType::KmsEthereum])?
        .into_iter()
        .find(|k| {
            k.public_key
                .as_address()
                .and_then(|a| Address::from_str(a).ok())
                == Some(address)
        });

    if let Some(record) = registered {
        return ctx.unlock_key(&record).await;
    }

    if !ctx.prompt.confirm(&format!(
        "No registered key pair for {address}. Do you want to enter its private key?"
    ))? {
        return Err(CliError::not_found(format!("Key pair for {address}")));
    }
    let private_key = ctx
        .prompt
        .password(&format!("Please enter the private key of {address}"))?;
    Ok(KeyPair::Ethereum(parse_private_key(&private_key)?))
}

fn same_public_jwk(a: &Jwk, b: &Jwk) -> bool {
    a.kty == b.kty && a.crv == b.crv && a.x == b.x && a.y == b.y
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use alloy::primitives::Signature;
    use base64ct::{Base64UrlUnpadded, Encoding};
    use chrono::Duration;

    use super::*;
    use crate::blockchain::OrgIdData;
    use crate::did::resolver::resolution_response;
    use crate::did::{DidDocument, DidResolutionResponse};
    use crate::operations::testing::{
        add_ethereum_key, address_of, settings, DID, OTHER_KEY, OWNER_KEY,
    };
    use crate::prompt::scripted::ScriptedPrompter;

    struct StaticResolver(Option<DidDocument>);

    impl DidResolver for StaticResolver {
        async fn resolve(&self, did: &str) -> DidResolutionResponse {
            let outcome = match &self.0 {
                Some(document) => Ok((
                    document.clone(),
                    OrgIdData {
                        token_id: "1".to_string(),
                        org_id: DID.to_string(),
                        owner: address_of(OWNER_KEY).to_string(),
                        org_json_uri: "ipfs://bafy".to_string(),
                        delegates: Vec::new(),
                    },
                )),
                None => Err("not found".to_string()),
            };
            resolution_response(did, Instant::now(), outcome)
        }
    }

    fn document_with_owner_method() -> DidDocument {
        let mut document = DidDocument::new(DID);
        document.upsert_verification_method(VerificationMethod::with_account(
            format!("{DID}#k1"),
            DID.to_string(),
            address_of(OWNER_KEY),
            "5",
        ));
        document
    }

    fn request(issuer: &str) -> TokenRequest {
        let args = Args {
            issuer: Some(issuer.to_string()),
            audience: Some("did:orgid:5:0x01".to_string()),
            scope: Some("read, write".to_string()),
            ..Default::default()
        };
        TokenRequest::from_args(&args, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn missing_method_fails_before_unlock() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);
        add_ethereum_key(&ctx, "k1", OWNER_KEY, "Abcdef12");

        let resolver = StaticResolver(Some(DidDocument::new(DID)));
        let result = issue(&request(&format!("{DID}#k1")), &ctx, &resolver).await;

        assert!(matches!(result, Err(CliError::NotFound(_))));
        assert!(prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn null_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        let result = issue(&request(&format!("{DID}#k1")), &ctx, &StaticResolver(None)).await;
        assert!(matches!(result, Err(CliError::NotFound(_))));
    }

    #[tokio::test]
    async fn registered_key_signs_recoverable_token() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new(["Abcdef12"]);
        let ctx = Context::new(settings(&dir), &prompt);
        add_ethereum_key(&ctx, "k1", OWNER_KEY, "Abcdef12");

        let resolver = StaticResolver(Some(document_with_owner_method()));
        let token = issue(&request(&format!("{DID}#k1")), &ctx, &resolver)
            .await
            .unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let claims: serde_json::Value =
            serde_json::from_slice(&Base64UrlUnpadded::decode_vec(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["iss"], format!("{DID}#k1"));
        assert_eq!(claims["scope"][1], "write");
        assert_eq!(
            claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
            3600
        );

        let signature =
            Signature::try_from(Base64UrlUnpadded::decode_vec(parts[2]).unwrap().as_slice()).unwrap();
        let input = format!("{}.{}", parts[0], parts[1]);
        assert_eq!(
            signature.recover_address_from_msg(input.as_bytes()).unwrap(),
            address_of(OWNER_KEY)
        );
    }

    #[tokio::test]
    async fn entered_key_must_match_the_account() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new(["yes", OTHER_KEY]);
        let ctx = Context::new(settings(&dir), &prompt);

        let resolver = StaticResolver(Some(document_with_owner_method()));
        let result = issue(&request(&format!("{DID}#k1")), &ctx, &resolver).await;

        assert!(matches!(result, Err(CliError::OwnershipMismatch { .. })));
    }

    #[test]
    fn argument_validation() {
        let now = Utc::now();

        assert!(matches!(
            TokenRequest::from_args(&Args::default(), now),
            Err(CliError::Configuration(_))
        ));

        let mut args = Args {
            issuer: Some(DID.to_string()),
            audience: Some("did:orgid:5:0x01".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TokenRequest::from_args(&args, now),
            Err(CliError::InvalidInput(_))
        ));

        args.issuer = Some(format!("{DID}#k1"));
        args.expiration = Some((now - Duration::minutes(1)).timestamp_millis().to_string());
        assert!(matches!(
            TokenRequest::from_args(&args, now),
            Err(CliError::InvalidInput(_))
        ));

        let later = now + Duration::days(1);
        args.expiration = Some(later.timestamp_millis().to_string());
        let request = TokenRequest::from_args(&args, now).unwrap();
        assert_eq!(
            request.expiration.map(|e| e.timestamp_millis()),
            Some(later.timestamp_millis())
        );
    }
}
