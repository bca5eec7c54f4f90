// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation resolve`: print the DID resolution response for `--did`.

use super::{print_object, report, Context};
use crate::cli::Args;
use crate::did::{parse_did, DidResolutionResponse, DidResolver, OrgIdResolver};
use crate::error::{CliError, CliResult};

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let did = required_did(args)?;
    let resolver = resolver_for(ctx, did)?;
    resolve_with(&resolver, did).await?;
    Ok(())
}

pub(crate) fn required_did(args: &Args) -> CliResult<&str> {
    args.did.as_deref().ok_or_else(|| {
        CliError::configuration("DID must be provided using \"--did\" option")
    })
}

/// Registry resolver for the network named in `did`.
pub(crate) fn resolver_for(ctx: &Context<'_>, did: &str) -> CliResult<OrgIdResolver> {
    let parsed = parse_did(did)?;
    Ok(OrgIdResolver::new(
        ctx.chain_client(&parsed.network)?,
        ctx.ipfs()?,
    ))
}

/// Resolve and print. A failed resolution is reported, not returned.
pub async fn resolve_with<R: DidResolver>(
    resolver: &R,
    did: &str,
) -> CliResult<DidResolutionResponse> {
    let response = resolver.resolve(did).await;

    match (&response.did_document, &response.did_resolution_metadata.error) {
        (Some(_), _) => report(format!("DID {did} has been resolved")),
        (None, error) => {
            let reason = error.as_deref().unwrap_or("unknown error");
            tracing::warn!(did, reason, "DID resolution returned no document");
            report(format!("Warning: DID {did} could not be resolved: {reason}"));
        }
    }

    print_object(&response)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::did::resolver::resolution_response;
    use crate::operations::testing::{settings, DID};
    use crate::prompt::scripted::ScriptedPrompter;

    struct Unreachable;

    impl DidResolver for Unreachable {
        async fn resolve(&self, did: &str) -> DidResolutionResponse {
            resolution_response(did, Instant::now(), Err("registry unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_resolution_is_not_an_error() {
        let response = resolve_with(&Unreachable, DID).await.unwrap();
        assert!(response.did_document.is_none());
        assert_eq!(
            response.did_resolution_metadata.error.as_deref(),
            Some("registry unavailable")
        );
    }

    #[tokio::test]
    async fn did_and_provider_are_required() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        assert!(matches!(
            run(&Args::default(), &ctx).await,
            Err(CliError::Configuration(_))
        ));

        let args = Args {
            did: Some(DID.to_string()),
            ..Default::default()
        };
        assert!(matches!(run(&args, &ctx).await, Err(CliError::Configuration(_))));

        let args = Args {
            did: Some("did:web:example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(run(&args, &ctx).await, Err(CliError::InvalidInput(_))));
    }
}
