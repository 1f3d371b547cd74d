// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Cosign Use Cases
//!
//! Application service that signs, attests and cleans container image
//! digests by running `cosign` in a throwaway container.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Assemble the execution environment for one request
//! - **Collaborators:**
//!   - Domain: request types, command builder
//!   - Infrastructure: ExecutionBackend (Docker), SecretResolver
//!
//! # Flow
//!
//! 1. Resolve the registry password (only when a username is also given)
//! 2. Build the cosign argument vector (keyless or keyed)
//! 3. Configure image, user, `COSIGN_YES`, `COSIGN_PASSWORD`,
//!    `COSIGN_PRIVATE_KEY` and mounted files
//! 4. Execute once and return captured stdout
//!
//! # Error Handling
//!
//! - SecretResolution: a secret could not be read, nothing was executed
//! - Execution: container runtime failure or non-zero exit, stderr verbatim
//!
//! There are no retries.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::command::{
    self, CosignCommand, RegistryLogin, AUTO_CONFIRM_ENV, DOCKER_CONFIG_FILE, PASSWORD_ENV,
    PREDICATE_FILE, PRIVATE_KEY_ENV,
};
use crate::domain::request::{
    AttestationRequest, CleanRequest, ExecutionTarget, RegistryCredentials, SigningRequest,
};
use crate::domain::runtime::{ExecutionBackend, ExecutionEnvironment, RuntimeError};
use crate::domain::secret::{Secret, SecretError, SecretResolver, SecretValue};

#[derive(Debug, Error)]
pub enum CosignError {
    #[error(transparent)]
    SecretResolution(#[from] SecretError),

    #[error(transparent)]
    Execution(#[from] RuntimeError),
}

/// Cosign Use Cases
#[async_trait]
pub trait CosignUseCase: Send + Sync {
    /// Sign an image digest. Keyless when `private_key` is absent.
    async fn sign(&self, request: SigningRequest) -> Result<String, CosignError>;

    /// Attach an SBOM attestation to an image digest.
    async fn attest(&self, request: AttestationRequest) -> Result<String, CosignError>;

    /// Remove signatures and/or attestations from an image digest.
    async fn clean(&self, request: CleanRequest) -> Result<String, CosignError>;
}

/// Standard implementation of CosignUseCase
pub struct StandardCosignService {
    backend: Arc<dyn ExecutionBackend>,
    secrets: Arc<dyn SecretResolver>,
}

impl StandardCosignService {
    pub fn new(backend: Arc<dyn ExecutionBackend>, secrets: Arc<dyn SecretResolver>) -> Self {
        Self { backend, secrets }
    }

    /// Resolve registry credentials. Partial pairs are dropped, not rejected.
    async fn resolve_registry(
        &self,
        registry: &RegistryCredentials,
    ) -> Result<Option<(String, SecretValue)>, CosignError> {
        if registry.is_partial() {
            warn!(
                "Ignoring registry credentials: both username and password are required \
                 (username set: {}, password set: {})",
                registry.username.is_some(),
                registry.password.is_some()
            );
        }

        match registry.complete() {
            Some((username, password)) => {
                let password = self.secrets.resolve(password).await?;
                Ok(Some((username.to_string(), password)))
            }
            None => Ok(None),
        }
    }

    /// Password exported as `COSIGN_PASSWORD`.
    ///
    /// Keyless runs always get a fresh random value: the key pair is created
    /// inside the container and never leaves it.
    async fn resolve_password(
        &self,
        private_key: Option<&Secret>,
        password: Option<&Secret>,
    ) -> Result<SecretValue, CosignError> {
        match (private_key, password) {
            (Some(_), Some(password)) => Ok(self.secrets.resolve(password).await?),
            (None, Some(password)) => {
                debug!("Keyless flow: discarding {} in favour of a random password", password);
                Ok(random_password())
            }
            (_, None) => Ok(random_password()),
        }
    }

    async fn prepare(
        &self,
        target: &ExecutionTarget,
        private_key: Option<&Secret>,
        password: Option<&Secret>,
    ) -> Result<ExecutionEnvironment, CosignError> {
        let password = self.resolve_password(private_key, password).await?;

        let mut env = ExecutionEnvironment::new(&target.image, &target.user)
            .with_home(target.user_home())
            .with_env_variable(AUTO_CONFIRM_ENV, "true")
            .with_secret_variable(PASSWORD_ENV, password);

        if let Some(private_key) = private_key {
            let key = self.secrets.resolve(private_key).await?;
            env = env.with_secret_variable(PRIVATE_KEY_ENV, key);
        }

        if let Some(docker_config) = &target.docker_config {
            env = env.with_mounted_file(
                format!("{}{}", target.user_home(), DOCKER_CONFIG_FILE),
                docker_config.clone(),
                &target.user,
            );
        }

        Ok(env)
    }

    async fn run(
        &self,
        env: ExecutionEnvironment,
        cmd: CosignCommand,
    ) -> Result<String, CosignError> {
        debug!("Running in {} as {}: {}", env.image, env.user, cmd.redacted());
        let output = self.backend.execute(env.with_exec(cmd.into_argv())).await?;
        if !output.stderr.is_empty() {
            debug!("cosign stderr: {}", output.stderr.trim_end());
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl CosignUseCase for StandardCosignService {
    async fn sign(&self, request: SigningRequest) -> Result<String, CosignError> {
        let registry = self.resolve_registry(&request.registry).await?;
        let login = registry.as_ref().map(|(username, password)| RegistryLogin {
            username,
            password,
        });
        let cmd = command::sign(&request, login);

        info!(
            "Signing {} ({})",
            request.digest,
            if request.is_keyless() { "keyless" } else { "keyed" }
        );

        let env = self
            .prepare(
                &request.target,
                request.private_key.as_ref(),
                request.password.as_ref(),
            )
            .await?;
        let stdout = self.run(env, cmd).await?;

        info!("Signed {}", request.digest);
        Ok(stdout)
    }

    async fn attest(&self, request: AttestationRequest) -> Result<String, CosignError> {
        let signing = &request.signing;
        let registry = self.resolve_registry(&signing.registry).await?;
        let login = registry.as_ref().map(|(username, password)| RegistryLogin {
            username,
            password,
        });
        let cmd = command::attest(&request, login);

        info!(
            "Attesting {} with {} predicate {:?} ({})",
            signing.digest,
            request.sbom_type,
            request.predicate,
            if signing.is_keyless() { "keyless" } else { "keyed" }
        );

        let env = self
            .prepare(
                &signing.target,
                signing.private_key.as_ref(),
                signing.password.as_ref(),
            )
            .await?
            .with_mounted_file(
                format!("{}{}", signing.target.user_home(), PREDICATE_FILE),
                request.predicate.clone(),
                &signing.target.user,
            );
        let stdout = self.run(env, cmd).await?;

        info!("Attested {}", signing.digest);
        Ok(stdout)
    }

    async fn clean(&self, request: CleanRequest) -> Result<String, CosignError> {
        let registry = self.resolve_registry(&request.registry).await?;
        let login = registry.as_ref().map(|(username, password)| RegistryLogin {
            username,
            password,
        });
        let cmd = command::clean(&request, login);

        info!("Cleaning {} from {}", request.clean_type, request.digest);

        let env = self.prepare(&request.target, None, None).await?;
        let stdout = self.run(env, cmd).await?;

        info!("Cleaned {}", request.digest);
        Ok(stdout)
    }
}

fn random_password() -> SecretValue {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros());
    SecretValue::new(nanos.to_string())
}
