// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line flags and dispatch.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::operations::{self, Context, Operation};
use crate::prompt::Prompter;

/// ORGiD command-line tool
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "orgid", version, about = "Manage ORGiD DIDs, keys, credentials and registry transactions")]
pub struct Args {
    /// config | orgIdVc | deploy:ipfs | bootstrap | keys:import | create | update | resolve | transfer | jwt
    #[arg(long)]
    pub operation: Option<String>,

    /// ethereum | pem | kmsEthereum | multisig | api
    #[arg(long = "keyType")]
    pub key_type: Option<String>,

    /// Token issuer DID URL (`did:orgid:...#key`)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Token audience DID
    #[arg(long)]
    pub audience: Option<String>,

    /// Token expiration, Unix epoch in milliseconds
    #[arg(long)]
    pub expiration: Option<String>,

    /// Comma-separated token scope
    #[arg(long)]
    pub scope: Option<String>,

    #[arg(long = "pubPem")]
    pub pub_pem: Option<String>,

    #[arg(long = "privPem")]
    pub priv_pem: Option<String>,

    /// Controller of a verification method added to an ORG.JSON
    #[arg(long)]
    pub controller: Option<String>,

    #[arg(long)]
    pub did: Option<String>,

    /// apiKeys | networkProviders
    #[arg(long)]
    pub record: Option<String>,

    /// File to deploy
    #[arg(long)]
    pub path: Option<String>,

    /// Type of the deployed file (orgIdVc)
    #[arg(long)]
    pub filetype: Option<String>,

    /// Output path for generated documents
    #[arg(long)]
    pub output: Option<String>,

    /// Deploy a generated VC right away (ipfs)
    #[arg(long)]
    pub deploy: Option<String>,

    #[arg(long = "newOwner")]
    pub new_owner: Option<String>,

    #[arg(long = "addToOrgId")]
    pub add_to_org_id: Option<String>,

    #[arg(long = "isDelegated")]
    pub is_delegated: Option<String>,

    #[arg(long = "nftName")]
    pub nft_name: Option<String>,

    #[arg(long = "nftDescription")]
    pub nft_description: Option<String>,

    #[arg(long = "nftImage")]
    pub nft_image: Option<String>,

    /// Project directory (defaults to ORGID_PROJECT_DIR or the working directory)
    #[arg(long)]
    pub project: Option<PathBuf>,
}

impl Args {
    pub fn operation(&self) -> CliResult<Operation> {
        self.operation
            .as_deref()
            .ok_or_else(|| {
                CliError::configuration(
                    "Operation type must be provided using \"--operation\" parameter",
                )
            })?
            .parse()
    }
}

/// Run the operation selected by `args` against the configured project.
pub async fn execute(args: Args, prompt: &dyn Prompter) -> CliResult<()> {
    let operation = args.operation()?;

    let mut settings = Settings::from_env();
    if let Some(project) = &args.project {
        settings = settings.with_project_dir(project);
    }

    let ctx = Context::new(settings, prompt);
    operations::run(operation, &args, &ctx).await
}
