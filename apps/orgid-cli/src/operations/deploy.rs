// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation deploy:ipfs`: publish a project file to IPFS.

use std::path::Path;

use chrono::Utc;

use super::{print_object, report, Context};
use crate::cli::Args;
use crate::config::WEB3_STORAGE_KEY_ID;
use crate::did::OrgIdVc;
use crate::error::{CliError, CliResult};
use crate::storage::{ConfigKind, DeploymentRecord, StorageError};

const ORG_ID_VC_FILETYPE: &str = "orgIdVc";

pub async fn run(args: &Args, ctx: &Context<'_>) -> CliResult<DeploymentRecord> {
    let path = args.path.as_deref().ok_or_else(|| {
        CliError::configuration("Path to the file to deploy must be provided using \"--path\" option")
    })?;

    let did = match args.filetype.as_deref() {
        Some(ORG_ID_VC_FILETYPE) => {
            let vc: OrgIdVc = ctx.store.storage().read_json(ctx.paths().resolve(path))?;
            Some(vc.credential_subject.id)
        }
        Some(other) => {
            return Err(CliError::configuration(format!(
                "Unknown file type \"{other}\""
            )))
        }
        None => None,
    };

    deploy_file(ctx, path, did.as_deref()).await
}

/// Upload `path` and record the deployment, binding it to `did` when given.
pub async fn deploy_file(
    ctx: &Context<'_>,
    path: &str,
    did: Option<&str>,
) -> CliResult<DeploymentRecord> {
    let content = ctx.store.storage().read_raw(ctx.paths().resolve(path))?;
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    let api_key = match ctx.config_value(ConfigKind::ApiKeys, WEB3_STORAGE_KEY_ID) {
        Err(CliError::NotFound(_)) => {
            return Err(CliError::configuration(format!(
                "API key \"{WEB3_STORAGE_KEY_ID}\" for web3.storage is not found. \
                 Please add it using \"--operation keys:import --keyType api\""
            )))
        }
        other => other?,
    };

    let ipfs = ctx.ipfs()?;
    report(format!("Uploading {file_name} to IPFS..."));
    let cid = ipfs.upload(&api_key, &file_name, content).await?;
    let uri = format!("ipfs://{cid}");

    let record = DeploymentRecord {
        kind: "ipfs".to_string(),
        path: path.to_string(),
        uri: uri.clone(),
        did: did.map(str::to_string),
        created_at: Utc::now(),
    };
    let superseded = ctx.store.add_deployment(record.clone())?;

    if let Some(did) = did {
        match ctx.store.update_org_id(did, |r| r.org_id_vc = Some(uri.clone())) {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(did, "Deployed VC belongs to an ORGiD outside this project")
            }
            Err(error) => return Err(error.into()),
        }
    }

    if let Some(previous) = superseded {
        tracing::warn!(
            previous = %previous.uri,
            current = %uri,
            path,
            "Superseded deployment stays pinned"
        );
        report(format!("Previous deployment {} has been replaced", previous.uri));
    }

    tracing::info!(%uri, path, ?did, "File deployed to IPFS");
    report(format!("File deployed to IPFS: {}", ipfs.gateway_link(&cid)));
    print_object(&record)?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::settings;
    use crate::prompt::scripted::ScriptedPrompter;

    #[tokio::test]
    async fn path_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        assert!(matches!(
            run(&Args::default(), &ctx).await,
            Err(CliError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        let args = Args {
            path: Some("missing.json".to_string()),
            ..Default::default()
        };
        assert!(matches!(run(&args, &ctx).await, Err(CliError::NotFound(_))));
    }

    #[tokio::test]
    async fn api_key_is_required_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.json"), b"{}").unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        let args = Args {
            path: Some("doc.json".to_string()),
            ..Default::default()
        };
        let error = run(&args, &ctx).await.unwrap_err();
        assert!(matches!(error, CliError::Configuration(message) if message.contains("keys:import")));
        assert!(ctx.store.load().unwrap().deployments.is_empty());
    }

    #[tokio::test]
    async fn unknown_filetype_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        let args = Args {
            path: Some("doc.json".to_string()),
            filetype: Some("pdf".to_string()),
            ..Default::default()
        };
        assert!(matches!(run(&args, &ctx).await, Err(CliError::Configuration(_))));
    }
}
