// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use ac_cli::{Cli, Parser};
use ac_logging::CliLogLevel;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Warnings only by default; stdout carries the agent's answer
    cli.logging.init("ac", CliLogLevel::Warn)?;

    ac_cli::run(cli).await
}
