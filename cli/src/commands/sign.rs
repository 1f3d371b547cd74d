// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `cosignctl sign`
//!
//! Signs a container image digest. Without `--private-key` a throwaway key
//! pair is generated inside the cosign container (keyless).

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cosign_core::application::CosignUseCase;
use cosign_core::domain::config::CosignConfig;
use cosign_core::domain::request::SigningRequest;

use super::args::{KeyArgs, RegistryArgs, TargetArgs};
use crate::service::build_service;

#[derive(Args, Debug)]
pub struct SignCommand {
    /// Container image digest to sign
    #[arg(value_name = "DIGEST")]
    pub digest: String,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl SignCommand {
    pub fn to_request(&self, config: &CosignConfig) -> SigningRequest {
        SigningRequest {
            digest: self.digest.clone(),
            private_key: self.key.private_key(),
            password: self.key.password(),
            registry: self.registry.credentials(),
            target: self.target.target(&config.spec.cosign),
        }
    }
}

pub async fn execute(cmd: SignCommand, config: &CosignConfig) -> Result<()> {
    let request = cmd.to_request(config);
    let service = build_service(config).await?;

    let stdout = service
        .sign(request)
        .await
        .with_context(|| format!("Failed to sign {}", cmd.digest))?;

    print!("{}", stdout);
    eprintln!("{}", format!("✓ Signed {}", cmd.digest).green());
    Ok(())
}
