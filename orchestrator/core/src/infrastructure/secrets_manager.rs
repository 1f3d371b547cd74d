// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Secrets Manager
//!
//! Resolves [`Secret`] handles to plaintext on the host running the
//! orchestrator. Plaintext only leaves this module inside a [`SecretValue`].
//!
//! ## Reference syntax
//!
//! | Reference     | Resolution                                         |
//! |---------------|----------------------------------------------------|
//! | `env:NAME`    | value of environment variable `NAME`               |
//! | `file:PATH`   | file contents, one trailing newline removed        |
//! | anything else | the literal itself                                 |

use async_trait::async_trait;
use tracing::debug;

use crate::domain::secret::{Secret, SecretError, SecretResolver, SecretSource, SecretValue};

#[derive(Debug, Clone, Default)]
pub struct SecretsManager;

impl SecretsManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretResolver for SecretsManager {
    async fn resolve(&self, secret: &Secret) -> Result<SecretValue, SecretError> {
        match secret.source() {
            SecretSource::Env(var) => {
                debug!("Resolving {} from environment variable {}", secret, var);
                std::env::var(var)
                    .map(SecretValue::new)
                    .map_err(|_| SecretError::EnvNotSet {
                        name: secret.name().to_string(),
                        var: var.clone(),
                    })
            }
            SecretSource::File(path) => {
                debug!("Resolving {} from file {:?}", secret, path);
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SecretError::Io {
                        name: secret.name().to_string(),
                        path: path.clone(),
                        source,
                    })?;
                Ok(SecretValue::new(strip_trailing_newline(content)))
            }
            SecretSource::Literal(value) => Ok(SecretValue::new(value.clone())),
        }
    }
}

fn strip_trailing_newline(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_resolves_literal() {
        let value = SecretsManager::new()
            .resolve(&Secret::literal("password", "hunter2"))
            .await
            .unwrap();
        assert_eq!(value.expose(), "hunter2");
    }

    #[tokio::test]
    async fn test_resolves_env() {
        std::env::set_var("COSIGN_ORCH_TEST_SECRET_RESOLVE", "from-env");
        let value = SecretsManager::new()
            .resolve(&Secret::from_env("password", "COSIGN_ORCH_TEST_SECRET_RESOLVE"))
            .await
            .unwrap();
        assert_eq!(value.expose(), "from-env");
    }

    #[tokio::test]
    async fn test_missing_env_fails() {
        let err = SecretsManager::new()
            .resolve(&Secret::from_env("registry-password", "COSIGN_ORCH_TEST_UNSET_VAR"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::EnvNotSet { .. }));
        assert!(err.to_string().contains("registry-password"));
    }

    #[tokio::test]
    async fn test_resolves_file_without_trailing_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "-----BEGIN KEY-----\nabc\n-----END KEY-----\n").unwrap();

        let value = SecretsManager::new()
            .resolve(&Secret::from_file("private-key", file.path()))
            .await
            .unwrap();
        assert_eq!(value.expose(), "-----BEGIN KEY-----\nabc\n-----END KEY-----");
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let err = SecretsManager::new()
            .resolve(&Secret::from_file("private-key", "/nonexistent/cosign.key"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::Io { .. }));
    }
}
