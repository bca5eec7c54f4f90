// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `--operation config`: network provider URIs and API keys.

use std::str::FromStr;

use chrono::Utc;

use super::{report, Context};
use crate::cli::Args;
use crate::crypto;
use crate::error::{CliError, CliResult};
use crate::storage::{ConfigKind, ConfigRecord};

pub fn run(args: &Args, ctx: &Context<'_>) -> CliResult<()> {
    let record = args.record.as_deref().ok_or_else(|| {
        CliError::configuration(
            "Project config record type must be provided using \"--record\" option",
        )
    })?;
    let kind = ConfigKind::from_str(record).map_err(CliError::Configuration)?;

    add_record(ctx, kind)?;
    Ok(())
}

/// Prompt for a config record of `kind` and store it.
pub fn add_record(ctx: &Context<'_>, kind: ConfigKind) -> CliResult<ConfigRecord> {
    let (id_message, value_message, subject) = match kind {
        ConfigKind::ApiKeys => ("Please enter API key Id", "Please enter the API key", "API key"),
        ConfigKind::NetworkProviders => (
            "Please enter a network Id",
            "Please enter the provider URI",
            "provider URI",
        ),
    };

    let id = ctx.prompt.text(id_message)?;
    if id.is_empty() {
        return Err(CliError::invalid_input("Config record Id must not be empty"));
    }

    let encrypted = ctx
        .prompt
        .confirm(&format!("Do you want to encrypt the {subject}?"))?;

    let value = if encrypted {
        ctx.prompt.password(value_message)?
    } else {
        ctx.prompt.text(value_message)?
    };
    if value.is_empty() {
        return Err(CliError::invalid_input(format!("The {subject} must not be empty")));
    }

    let value = if encrypted {
        let passphrase = ctx.prompt.password("Please provide a password")?;
        crypto::validate_passphrase(&passphrase)?;
        crypto::encrypt(&value, &passphrase)?
    } else {
        value
    };

    let record = ctx.store.add_config_record(
        kind,
        ConfigRecord {
            id,
            value,
            encrypted,
            created_at: Utc::now(),
        },
    )?;

    tracing::info!(%kind, id = %record.id, encrypted, "Config record stored");
    match kind {
        ConfigKind::ApiKeys => report(format!(
            "Config record for the API key #{} has been successfully added",
            record.id
        )),
        ConfigKind::NetworkProviders => report(format!(
            "Config record for the network #{} has been successfully added",
            record.id
        )),
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::settings;
    use crate::prompt::scripted::ScriptedPrompter;

    #[test]
    fn stores_plain_provider() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new(["5", "no", "http://localhost:8545"]);
        let ctx = Context::new(settings(&dir), &prompt);
        let args = Args {
            record: Some("networkProviders".to_string()),
            ..Default::default()
        };

        run(&args, &ctx).unwrap();

        let record = ctx.store.config_record(ConfigKind::NetworkProviders, "5").unwrap();
        assert!(!record.encrypted);
        assert_eq!(record.value, "http://localhost:8545");
        assert_eq!(
            ctx.config_value(ConfigKind::NetworkProviders, "5").unwrap(),
            "http://localhost:8545"
        );
    }

    #[test]
    fn stores_encrypted_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new(["w3s", "yes", "token-123", "Abcdef12", "Abcdef12"]);
        let ctx = Context::new(settings(&dir), &prompt);

        let record = add_record(&ctx, ConfigKind::ApiKeys).unwrap();
        assert!(record.encrypted);
        assert_ne!(record.value, "token-123");

        assert_eq!(ctx.config_value(ConfigKind::ApiKeys, "w3s").unwrap(), "token-123");
    }

    #[test]
    fn weak_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::new(["w3s", "yes", "token-123", "short"]);
        let ctx = Context::new(settings(&dir), &prompt);

        assert!(matches!(
            add_record(&ctx, ConfigKind::ApiKeys),
            Err(CliError::InvalidInput(_))
        ));
        assert!(ctx.store.config_record(ConfigKind::ApiKeys, "w3s").is_err());
    }

    #[test]
    fn record_type_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = ScriptedPrompter::default();
        let ctx = Context::new(settings(&dir), &prompt);

        assert!(matches!(run(&Args::default(), &ctx), Err(CliError::Configuration(_))));

        let args = Args {
            record: Some("secrets".to_string()),
            ..Default::default()
        };
        assert!(matches!(run(&args, &ctx), Err(CliError::Configuration(_))));
    }
}
