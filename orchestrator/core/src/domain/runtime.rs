// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::secret::SecretValue;

/// A host file placed into the container before the command starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedFile {
    /// Path on the host
    pub source: PathBuf,
    /// Absolute path inside the container
    pub target: String,
    /// User that owns the file inside the container
    pub owner: String,
}

/// Everything needed to run one cosign command in a throwaway container.
#[derive(Debug, Clone)]
pub struct ExecutionEnvironment {
    pub image: String,
    pub user: String,
    /// Existing home directory of `user`. Directories a mounted file needs
    /// below it are created owned by the file's owner.
    pub home: Option<String>,
    pub env: BTreeMap<String, String>,
    /// Secret variables. `SecretValue` keeps them out of `Debug` output.
    pub secret_env: BTreeMap<String, SecretValue>,
    pub files: Vec<MountedFile>,
    pub cmd: Vec<String>,
}

impl ExecutionEnvironment {
    pub fn new(image: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            user: user.into(),
            home: None,
            env: BTreeMap::new(),
            secret_env: BTreeMap::new(),
            files: Vec::new(),
            cmd: Vec::new(),
        }
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Directories that must be created for the mounted files, parents
    /// first. Only paths strictly below `home` are returned.
    pub fn missing_directories(&self) -> Vec<String> {
        let Some(home) = self.home.as_deref() else {
            return Vec::new();
        };
        let home = home.trim_end_matches('/');

        let mut dirs: Vec<String> = Vec::new();
        for file in &self.files {
            let Some(relative) = file
                .target
                .strip_prefix(home)
                .and_then(|r| r.strip_prefix('/'))
            else {
                continue;
            };
            let mut current = home.to_string();
            let components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
            for component in components.iter().take(components.len().saturating_sub(1)) {
                current = format!("{}/{}", current, component);
                if !dirs.contains(&current) {
                    dirs.push(current.clone());
                }
            }
        }
        dirs
    }

    pub fn with_env_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn with_secret_variable(mut self, name: impl Into<String>, value: SecretValue) -> Self {
        self.secret_env.insert(name.into(), value);
        self
    }

    pub fn with_mounted_file(
        mut self,
        target: impl Into<String>,
        source: impl Into<PathBuf>,
        owner: impl Into<String>,
    ) -> Self {
        self.files.push(MountedFile {
            source: source.into(),
            target: target.into(),
            owner: owner.into(),
        });
        self
    }

    pub fn with_exec(mut self, cmd: Vec<String>) -> Self {
        self.cmd = cmd;
        self
    }

    /// `KEY=VALUE` pairs for plain and secret variables, in that order.
    pub fn env_pairs(&self) -> Vec<String> {
        self.env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .chain(
                self.secret_env
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v.expose())),
            )
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to connect to container runtime: {0}")]
    ConnectionFailed(String),
    #[error("Failed to pull image: {0}")]
    ImagePullFailed(String),
    #[error("Failed to spawn container: {0}")]
    SpawnFailed(String),
    #[error("Command failed with exit code {exit_code}: {stderr}")]
    ExecutionFailed { exit_code: i64, stderr: String },
}

/// Runs an [`ExecutionEnvironment`] to completion and captures its output.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, env: ExecutionEnvironment) -> Result<ExecutionOutput, RuntimeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_pairs_include_secrets_but_debug_does_not() {
        let env = ExecutionEnvironment::new("chainguard/cosign:latest", "nonroot")
            .with_env_variable("COSIGN_YES", "true")
            .with_secret_variable("COSIGN_PASSWORD", SecretValue::new("hunter2"));

        assert_eq!(
            env.env_pairs(),
            vec!["COSIGN_YES=true".to_string(), "COSIGN_PASSWORD=hunter2".to_string()]
        );
        assert!(!format!("{:?}", env).contains("hunter2"));
    }

    #[test]
    fn test_mounted_files_keep_order() {
        let env = ExecutionEnvironment::new("img", "nonroot")
            .with_mounted_file("/home/nonroot/.docker/config.json", "/tmp/config.json", "nonroot")
            .with_mounted_file("/home/nonroot/sbom.json", "/tmp/sbom.json", "nonroot");
        assert_eq!(env.files.len(), 2);
        assert_eq!(env.files[0].target, "/home/nonroot/.docker/config.json");
        assert_eq!(env.files[1].source, PathBuf::from("/tmp/sbom.json"));
    }

    #[test]
    fn test_missing_directories_below_home() {
        let env = ExecutionEnvironment::new("img", "nonroot")
            .with_mounted_file("/home/nonroot/.docker/config.json", "/tmp/config.json", "nonroot")
            .with_mounted_file("/home/nonroot/sbom.json", "/tmp/sbom.json", "nonroot");
        assert!(env.missing_directories().is_empty());

        let env = env
            .with_home("/home/nonroot/")
            .with_mounted_file("/home/nonroot/a/b/c.json", "/tmp/c.json", "nonroot")
            .with_mounted_file("/etc/outside.json", "/tmp/outside.json", "nonroot")
            .with_mounted_file("/home/nonrootx/evil.json", "/tmp/evil.json", "nonroot");
        assert_eq!(
            env.missing_directories(),
            vec![
                "/home/nonroot/.docker".to_string(),
                "/home/nonroot/a".to_string(),
                "/home/nonroot/a/b".to_string(),
            ]
        );
    }
}
