// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process service wiring
//!
//! Loads configuration, connects to Docker and builds the cosign use cases.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use cosign_core::application::StandardCosignService;
use cosign_core::domain::config::CosignConfig;
use cosign_core::infrastructure::{DockerRuntime, SecretsManager};

/// Load the configuration from `path`, or discover it.
pub fn load_config(path: Option<PathBuf>) -> Result<CosignConfig> {
    CosignConfig::load_or_default(path).context("Failed to load configuration")
}

pub async fn build_service(config: &CosignConfig) -> Result<StandardCosignService> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let runtime = &config.spec.runtime;
    let docker = DockerRuntime::new(
        runtime.docker_socket_path.clone(),
        runtime.network_mode.clone(),
        runtime.autopull,
    )
    .context("Failed to initialize Docker runtime")?;

    docker
        .healthcheck()
        .await
        .context("Docker healthcheck failed")?;
    debug!("Docker runtime ready");

    Ok(StandardCosignService::new(
        Arc::new(docker),
        Arc::new(SecretsManager::new()),
    ))
}
