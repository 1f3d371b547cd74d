// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Arguments shared by sign, attest and clean
//!
//! Secret arguments take a reference: `env:VAR`, `file:PATH`,
//! `literal:VALUE` or a bare literal value. A plain value that itself starts
//! with `env:`, `file:` or `literal:` must be written as `literal:VALUE`.
//! References are resolved only when the command runs.

use clap::Args;
use std::path::PathBuf;

use cosign_core::domain::config::CosignDefaults;
use cosign_core::domain::request::{ExecutionTarget, RegistryCredentials};
use cosign_core::domain::secret::Secret;

#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Cosign private key reference (omit for keyless)
    #[arg(long, value_name = "SECRET")]
    pub private_key: Option<String>,

    /// Cosign key password reference (random if omitted)
    #[arg(long, value_name = "SECRET")]
    pub password: Option<String>,
}

impl KeyArgs {
    pub fn private_key(&self) -> Option<Secret> {
        self.private_key
            .as_deref()
            .map(|r| Secret::from_ref("private-key", r))
    }

    pub fn password(&self) -> Option<Secret> {
        self.password.as_deref().map(|r| Secret::from_ref("password", r))
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// Registry username
    #[arg(long, env = "COSIGN_REGISTRY_USERNAME")]
    pub registry_username: Option<String>,

    /// Registry password reference (env:VAR, file:PATH, literal:VALUE or a plain
    /// value; use literal: for passwords starting with env: or file:)
    #[arg(long, value_name = "SECRET", env = "COSIGN_REGISTRY_PASSWORD")]
    pub registry_password: Option<String>,
}

impl RegistryArgs {
    pub fn credentials(&self) -> RegistryCredentials {
        RegistryCredentials {
            username: self.registry_username.clone(),
            password: self
                .registry_password
                .as_deref()
                .map(|r| Secret::from_ref("registry-password", r)),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Docker config.json with registry auth
    #[arg(long, value_name = "FILE")]
    pub docker_config: Option<PathBuf>,

    /// Cosign container image [default: from config, chainguard/cosign:latest]
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Cosign container image user [default: from config, nonroot]
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,
}

impl TargetArgs {
    /// Command-line values win over configured defaults
    pub fn target(&self, defaults: &CosignDefaults) -> ExecutionTarget {
        let mut target = defaults.target();
        if let Some(image) = &self.image {
            target.image = image.clone();
        }
        if let Some(user) = &self.user {
            target.user = user.clone();
        }
        target.docker_config = self.docker_config.clone();
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosign_core::domain::secret::SecretSource;

    #[test]
    fn test_target_overrides_defaults() {
        let defaults = CosignDefaults::default();

        let target = TargetArgs::default().target(&defaults);
        assert_eq!(target.image, "chainguard/cosign:latest");
        assert_eq!(target.user, "nonroot");
        assert!(target.docker_config.is_none());

        let args = TargetArgs {
            docker_config: Some(PathBuf::from("config.json")),
            image: None,
            user: Some("builder".to_string()),
        };
        let target = args.target(&defaults);
        assert_eq!(target.image, "chainguard/cosign:latest");
        assert_eq!(target.user, "builder");
        assert_eq!(target.docker_config, Some(PathBuf::from("config.json")));
    }

    #[test]
    fn test_registry_credentials_keep_partial_input() {
        let args = RegistryArgs {
            registry_username: Some("ci-bot".to_string()),
            registry_password: None,
        };
        let creds = args.credentials();
        assert!(creds.is_partial());
        assert!(creds.complete().is_none());

        let args = RegistryArgs {
            registry_username: Some("ci-bot".to_string()),
            registry_password: Some("env:REGISTRY_TOKEN".to_string()),
        };
        assert_eq!(args.credentials().complete().map(|(u, _)| u), Some("ci-bot"));
    }

    #[test]
    fn test_registry_password_literal_prefix() {
        let args = RegistryArgs {
            registry_username: Some("ci-bot".to_string()),
            registry_password: Some("literal:env:not-a-var".to_string()),
        };
        let creds = args.credentials();
        let (_, password) = creds.complete().unwrap();
        assert_eq!(
            password.source(),
            &SecretSource::Literal("env:not-a-var".to_string())
        );
    }
}
