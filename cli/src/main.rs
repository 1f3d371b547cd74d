// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # cosignctl
//!
//! Signs and attests container image digests from CI by running `cosign`
//! in a throwaway container.
//!
//! ## Commands
//!
//! - `cosignctl sign <DIGEST>` - Sign a digest (keyless unless `--private-key`)
//! - `cosignctl attest <DIGEST> --predicate <FILE>` - Attach an SBOM attestation
//! - `cosignctl clean <DIGEST>` - Remove signatures and/or attestations
//! - `cosignctl config show|validate|generate` - Configuration management
//!
//! cosign's stdout is written to stdout; logs and status go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cosign_orchestrator::commands::{
    self, AttestCommand, CleanCommand, ConfigCommand, SignCommand,
};
use cosign_orchestrator::service::load_config;

/// Sign and attest container images with cosign
#[derive(Parser)]
#[command(name = "cosignctl")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "COSIGN_ORCHESTRATOR_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(
        long,
        global = true,
        default_value = "info",
        env = "COSIGN_ORCHESTRATOR_LOG_LEVEL"
    )]
    log_level: String,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogFormat::Text,
        env = "COSIGN_ORCHESTRATOR_LOG_FORMAT"
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a container image digest
    #[command(name = "sign")]
    Sign(SignCommand),

    /// Attest the SBOM of a container image digest
    #[command(name = "attest")]
    Attest(AttestCommand),

    /// Remove signatures and attestations of a container image digest
    #[command(name = "clean")]
    Clean(CleanCommand),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Sign(command) => {
            let config = load_config(cli.config)?;
            commands::sign::execute(command, &config).await
        }
        Commands::Attest(command) => {
            let config = load_config(cli.config)?;
            commands::attest::execute(command, &config).await
        }
        Commands::Clean(command) => {
            let config = load_config(cli.config)?;
            commands::clean::execute(command, &config).await
        }
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging. Logs go to stderr.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.compact().init(),
    }

    Ok(())
}
