// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use cosign_core::domain::config::{CosignConfig, CONFIG_PATH_ENV};

use crate::service::load_config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./cosign-config.yaml)
        #[arg(short, long, default_value = "./cosign-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

/// Only `show` reads the discovered configuration, so `validate` and
/// `generate` keep working while that file is broken.
pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => {
            let config = load_config(config_override.clone())?;
            show(&config, config_override, paths)
        }
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, examples } => generate(output, examples),
    }
}

fn show(config: &CosignConfig, config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./cosign-config.yaml");
        println!("  4. ~/.cosign-orchestrator/config.yaml");
        println!("  5. /etc/cosign-orchestrator/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let cosign = &config.spec.cosign;
    println!("{}", "Cosign:".bold());
    println!("  Image: {}", cosign.image);
    println!("  User: {}", cosign.user);
    println!("  SBOM type: {}", cosign.sbom_type);
    println!("  Clean type: {}", cosign.clean_type);
    println!();

    let runtime = &config.spec.runtime;
    println!("{}", "Runtime:".bold());
    println!(
        "  Docker socket: {}",
        runtime.docker_socket_path.as_deref().unwrap_or("(auto-detect)")
    );
    println!(
        "  Network mode: {}",
        runtime.network_mode.as_deref().unwrap_or("(default)")
    );
    println!("  Autopull: {}", runtime.autopull);

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = load_config(config_path)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse_and_validate() {
        for yaml in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let config = CosignConfig::from_yaml_str(yaml).unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cosign-config.yaml");
        generate(output.clone(), false).unwrap();
        let config = CosignConfig::from_yaml_file(&output).unwrap();
        assert_eq!(config.spec.cosign.user, "nonroot");
    }

    #[tokio::test]
    async fn test_validate_and_generate_ignore_broken_config() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "apiVersion: [broken").unwrap();

        let output = dir.path().join("fresh.yaml");
        handle_command(
            ConfigCommand::Generate {
                output: output.clone(),
                examples: true,
            },
            Some(broken.clone()),
        )
        .await
        .unwrap();
        assert!(output.is_file());

        handle_command(
            ConfigCommand::Validate {
                file: Some(output.clone()),
            },
            Some(broken.clone()),
        )
        .await
        .unwrap();

        assert!(handle_command(ConfigCommand::Validate { file: None }, Some(broken.clone()))
            .await
            .is_err());
        assert!(handle_command(ConfigCommand::Show { paths: false }, Some(broken))
            .await
            .is_err());
    }
}
