// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orgid_cli::cli::{execute, Args};
use orgid_cli::config::{DEFAULT_LOG_FILTER, LOG_FORMAT_ENV};
use orgid_cli::prompt::TerminalPrompter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries results only; logs go to stderr
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    let args = Args::parse();

    if let Err(error) = execute(args, &TerminalPrompter).await {
        tracing::debug!(?error, "Operation failed");
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
