// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Request Types - one value bundle per cosign operation
//
// Every request is transient and owns everything needed to build its
// execution environment: the digest, optional key material, registry
// credentials and the container image/user that runs cosign.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::secret::Secret;

pub const DEFAULT_COSIGN_IMAGE: &str = "chainguard/cosign:latest";
pub const DEFAULT_COSIGN_USER: &str = "nonroot";
pub const DEFAULT_SBOM_TYPE: &str = "spdxjson";

/// Registry login passed to cosign as `--registry-username/--registry-password`.
#[derive(Debug, Clone, Default)]
pub struct RegistryCredentials {
    pub username: Option<String>,
    pub password: Option<Secret>,
}

impl RegistryCredentials {
    pub fn new(username: impl Into<String>, password: Secret) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password),
        }
    }

    /// Both halves, or nothing. A lone username or password is dropped.
    pub fn complete(&self) -> Option<(&str, &Secret)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password)),
            _ => None,
        }
    }

    /// True when exactly one half was supplied.
    pub fn is_partial(&self) -> bool {
        self.username.is_some() != self.password.is_some()
    }
}

/// Container image and user that run cosign, plus optional Docker config.
#[derive(Debug, Clone)]
pub struct ExecutionTarget {
    pub image: String,
    pub user: String,
    /// Host path of a Docker `config.json` with registry auth
    pub docker_config: Option<PathBuf>,
}

impl ExecutionTarget {
    /// Home directory of the execution user, with trailing slash
    pub fn user_home(&self) -> String {
        format!("/home/{}/", self.user)
    }
}

impl Default for ExecutionTarget {
    fn default() -> Self {
        Self {
            image: DEFAULT_COSIGN_IMAGE.to_string(),
            user: DEFAULT_COSIGN_USER.to_string(),
            docker_config: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// Container image digest to sign
    pub digest: String,
    /// Cosign private key (omit for keyless)
    pub private_key: Option<Secret>,
    /// Cosign key password (random if omitted)
    pub password: Option<Secret>,
    pub registry: RegistryCredentials,
    pub target: ExecutionTarget,
}

impl SigningRequest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            private_key: None,
            password: None,
            registry: RegistryCredentials::default(),
            target: ExecutionTarget::default(),
        }
    }

    pub fn with_private_key(mut self, key: Secret) -> Self {
        self.private_key = Some(key);
        self
    }

    pub fn with_password(mut self, password: Secret) -> Self {
        self.password = Some(password);
        self
    }

    pub fn with_registry(mut self, registry: RegistryCredentials) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_target(mut self, target: ExecutionTarget) -> Self {
        self.target = target;
        self
    }

    pub fn is_keyless(&self) -> bool {
        self.private_key.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct AttestationRequest {
    pub signing: SigningRequest,
    /// Host path of the SBOM predicate
    pub predicate: PathBuf,
    /// Predicate type passed to `cosign attest --type`
    pub sbom_type: String,
}

impl AttestationRequest {
    pub fn new(digest: impl Into<String>, predicate: impl Into<PathBuf>) -> Self {
        Self {
            signing: SigningRequest::new(digest),
            predicate: predicate.into(),
            sbom_type: DEFAULT_SBOM_TYPE.to_string(),
        }
    }

    pub fn with_sbom_type(mut self, sbom_type: impl Into<String>) -> Self {
        self.sbom_type = sbom_type.into();
        self
    }
}

/// What `cosign clean` removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanType {
    Signature,
    Attestation,
    #[default]
    All,
}

impl CleanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleanType::Signature => "signature",
            CleanType::Attestation => "attestation",
            CleanType::All => "all",
        }
    }
}

impl fmt::Display for CleanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signature" => Ok(CleanType::Signature),
            "attestation" => Ok(CleanType::Attestation),
            "all" => Ok(CleanType::All),
            other => Err(format!(
                "Unknown clean type '{}'. Supported: signature, attestation, all",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub digest: String,
    pub clean_type: CleanType,
    pub registry: RegistryCredentials,
    pub target: ExecutionTarget,
}

impl CleanRequest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            clean_type: CleanType::default(),
            registry: RegistryCredentials::default(),
            target: ExecutionTarget::default(),
        }
    }

    pub fn with_clean_type(mut self, clean_type: CleanType) -> Self {
        self.clean_type = clean_type;
        self
    }

    pub fn with_registry(mut self, registry: RegistryCredentials) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_target(mut self, target: ExecutionTarget) -> Self {
        self.target = target;
        self
    }
}
