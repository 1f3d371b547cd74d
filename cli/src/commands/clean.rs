// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `cosignctl clean`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cosign_core::application::CosignUseCase;
use cosign_core::domain::config::CosignConfig;
use cosign_core::domain::request::{CleanRequest, CleanType};

use super::args::{RegistryArgs, TargetArgs};
use crate::service::build_service;

#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Container image digest to clean
    #[arg(value_name = "DIGEST")]
    pub digest: String,

    /// What to remove: signature, attestation or all [default: from config, all]
    #[arg(long = "type", value_name = "TYPE")]
    pub clean_type: Option<CleanType>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl CleanCommand {
    pub fn to_request(&self, config: &CosignConfig) -> CleanRequest {
        CleanRequest {
            digest: self.digest.clone(),
            clean_type: self.clean_type.unwrap_or(config.spec.cosign.clean_type),
            registry: self.registry.credentials(),
            target: self.target.target(&config.spec.cosign),
        }
    }
}

pub async fn execute(cmd: CleanCommand, config: &CosignConfig) -> Result<()> {
    let request = cmd.to_request(config);
    let service = build_service(config).await?;

    let stdout = service
        .clean(request)
        .await
        .with_context(|| format!("Failed to clean {}", cmd.digest))?;

    print!("{}", stdout);
    eprintln!("{}", format!("✓ Cleaned {}", cmd.digest).green());
    Ok(())
}
