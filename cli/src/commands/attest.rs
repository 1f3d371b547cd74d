// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `cosignctl attest`
//!
//! Attaches an SBOM attestation to a container image digest.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use cosign_core::application::CosignUseCase;
use cosign_core::domain::config::CosignConfig;
use cosign_core::domain::request::{AttestationRequest, SigningRequest};

use super::args::{KeyArgs, RegistryArgs, TargetArgs};
use crate::service::build_service;

#[derive(Args, Debug)]
pub struct AttestCommand {
    /// Container image digest to attest
    #[arg(value_name = "DIGEST")]
    pub digest: String,

    /// SBOM file
    #[arg(long, value_name = "FILE")]
    pub predicate: PathBuf,

    /// SBOM type [default: from config, spdxjson]
    #[arg(long, value_name = "TYPE")]
    pub sbom_type: Option<String>,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl AttestCommand {
    pub fn to_request(&self, config: &CosignConfig) -> AttestationRequest {
        AttestationRequest {
            signing: SigningRequest {
                digest: self.digest.clone(),
                private_key: self.key.private_key(),
                password: self.key.password(),
                registry: self.registry.credentials(),
                target: self.target.target(&config.spec.cosign),
            },
            predicate: self.predicate.clone(),
            sbom_type: self
                .sbom_type
                .clone()
                .unwrap_or_else(|| config.spec.cosign.sbom_type.clone()),
        }
    }
}

pub async fn execute(cmd: AttestCommand, config: &CosignConfig) -> Result<()> {
    if !cmd.predicate.is_file() {
        anyhow::bail!("Predicate file not found: {}", cmd.predicate.display());
    }

    let request = cmd.to_request(config);
    let service = build_service(config).await?;

    let stdout = service
        .attest(request)
        .await
        .with_context(|| format!("Failed to attest {}", cmd.digest))?;

    print!("{}", stdout);
    eprintln!("{}", format!("✓ Attested {}", cmd.digest).green());
    Ok(())
}
