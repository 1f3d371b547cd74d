// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Secret handles and resolved secret material.
//!
//! A [`Secret`] is an opaque reference (`env:NAME`, `file:/path`,
//! `literal:VALUE` or a bare literal) that is only turned into plaintext by a [`SecretResolver`] at
//! execution time. Neither type prints its contents through `Debug` or
//! `Display`.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const REDACTED: &str = "***";

/// Where a secret's material comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Read from an environment variable of the calling process
    Env(String),
    /// Read from a file on the host
    File(PathBuf),
    /// Inline material
    Literal(String),
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Literal(_) => f.debug_tuple("Literal").field(&REDACTED).finish(),
        }
    }
}

/// Opaque handle to secret material.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    name: String,
    source: SecretSource,
}

impl Secret {
    /// Parse a secret reference: `env:NAME`, `file:PATH`, `literal:VALUE`,
    /// otherwise a literal. `literal:` keeps values that start with another
    /// prefix verbatim.
    pub fn from_ref(name: impl Into<String>, reference: &str) -> Self {
        let source = if let Some(value) = reference.strip_prefix("literal:") {
            SecretSource::Literal(value.to_string())
        } else if let Some(var) = reference.strip_prefix("env:") {
            SecretSource::Env(var.to_string())
        } else if let Some(path) = reference.strip_prefix("file:") {
            SecretSource::File(PathBuf::from(path))
        } else {
            SecretSource::Literal(reference.to_string())
        };
        Self { name: name.into(), source }
    }

    pub fn from_env(name: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: SecretSource::Env(var.into()),
        }
    }

    pub fn from_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: SecretSource::File(path.into()),
        }
    }

    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: SecretSource::Literal(value.into()),
        }
    }

    /// Logical name, safe to log
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &SecretSource {
        &self.source
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("source", &REDACTED)
            .finish()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secret({})", self.name)
    }
}

/// Resolved plaintext of a [`Secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Plaintext access. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret '{name}' could not be resolved: environment variable {var} is not set")]
    EnvNotSet { name: String, var: String },

    #[error("Secret '{name}' could not be read from {path}: {source}")]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns secret handles into plaintext.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, secret: &Secret) -> Result<SecretValue, SecretError>;
}
