// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Cosign Orchestrator Configuration
//
// Defines the configuration schema for the cosign orchestrator, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Default cosign image, user and SBOM type
// - Docker runtime connection settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::request::{
    CleanType, ExecutionTarget, DEFAULT_COSIGN_IMAGE, DEFAULT_COSIGN_USER, DEFAULT_SBOM_TYPE,
};

pub const API_VERSION: &str = "100monkeys.ai/v1";
pub const KIND: &str = "CosignConfig";
pub const CONFIG_PATH_ENV: &str = "COSIGN_ORCHESTRATOR_CONFIG_PATH";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosignConfigManifest {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "CosignConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: CosignConfigSpec,
}

pub type CosignConfig = CosignConfigManifest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CosignConfigSpec {
    /// Defaults applied to every request
    #[serde(default)]
    pub cosign: CosignDefaults,

    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosignDefaults {
    /// Image that provides the cosign binary
    #[serde(default = "default_image")]
    pub image: String,

    /// User the container runs as; its home holds keys and mounted files
    #[serde(default = "default_user")]
    pub user: String,

    /// Predicate type for `attest`
    #[serde(default = "default_sbom_type")]
    pub sbom_type: String,

    /// What `clean` removes when not given on the command line
    #[serde(default)]
    pub clean_type: CleanType,
}

impl Default for CosignDefaults {
    fn default() -> Self {
        Self {
            image: default_image(),
            user: default_user(),
            sbom_type: default_sbom_type(),
            clean_type: CleanType::default(),
        }
    }
}

impl CosignDefaults {
    pub fn target(&self) -> ExecutionTarget {
        ExecutionTarget {
            image: self.image.clone(),
            user: self.user.clone(),
            docker_config: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to Docker socket
    /// Default: auto-detect (DOCKER_HOST, then the platform socket)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_socket_path: Option<String>,

    /// Docker network for the cosign container (None = default bridge)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    /// Pull the cosign image when it is missing locally
    #[serde(default = "default_true")]
    pub autopull: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            docker_socket_path: None,
            network_mode: None,
            autopull: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_image() -> String {
    DEFAULT_COSIGN_IMAGE.to_string()
}

fn default_user() -> String {
    DEFAULT_COSIGN_USER.to_string()
}

fn default_sbom_type() -> String {
    DEFAULT_SBOM_TYPE.to_string()
}

impl Default for CosignConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "cosign-orchestrator".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                labels: None,
            },
            spec: CosignConfigSpec::default(),
        }
    }
}

impl CosignConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. COSIGN_ORCHESTRATOR_CONFIG_PATH environment variable
    /// 2. ./cosign-config.yaml (working directory)
    /// 3. ~/.cosign-orchestrator/config.yaml (user home)
    /// 4. /etc/cosign-orchestrator/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./cosign-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".cosign-orchestrator").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/cosign-orchestrator/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(image) = std::env::var("COSIGN_ORCHESTRATOR_IMAGE") {
            tracing::info!("Environment override: COSIGN_ORCHESTRATOR_IMAGE={}", image);
            self.spec.cosign.image = image;
        }
        if let Ok(user) = std::env::var("COSIGN_ORCHESTRATOR_USER") {
            tracing::info!("Environment override: COSIGN_ORCHESTRATOR_USER={}", user);
            self.spec.cosign.user = user;
        }
        if let Ok(socket) = std::env::var("COSIGN_ORCHESTRATOR_DOCKER_SOCKET") {
            tracing::info!("Environment override: COSIGN_ORCHESTRATOR_DOCKER_SOCKET={}", socket);
            self.spec.runtime.docker_socket_path = Some(socket);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.cosign.image.trim().is_empty() {
            anyhow::bail!("spec.cosign.image cannot be empty");
        }

        if self.spec.cosign.user.trim().is_empty() {
            anyhow::bail!("spec.cosign.user cannot be empty");
        }

        if self.spec.cosign.sbom_type.trim().is_empty() {
            anyhow::bail!("spec.cosign.sbom_type cannot be empty");
        }

        Ok(())
    }
}
