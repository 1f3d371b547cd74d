// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Cosign command builder
//!
//! Renders a request into the exact argument vector run inside the cosign
//! container. Keyless requests become a two-stage `sh -c` script that first
//! generates a throwaway key pair in the user's home directory; keyed
//! requests run `cosign` directly with the key read from
//! `COSIGN_PRIVATE_KEY`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure argument assembly, no I/O

use crate::domain::request::{AttestationRequest, CleanRequest, SigningRequest};
use crate::domain::secret::SecretValue;

pub const COSIGN_BIN: &str = "cosign";
pub const PRIVATE_KEY_ENV: &str = "COSIGN_PRIVATE_KEY";
pub const PASSWORD_ENV: &str = "COSIGN_PASSWORD";
pub const AUTO_CONFIRM_ENV: &str = "COSIGN_YES";
pub const EXPERIMENTAL_ENV: &str = "COSIGN_EXPERIMENTAL";

/// Key reference for keyed flows
pub const PRIVATE_KEY_REF: &str = "env://COSIGN_PRIVATE_KEY";
/// Prefix passed to `generate-key-pair`, relative to the user home
pub const KEY_PAIR_PREFIX: &str = "cosign";
/// Predicate mount point, relative to the user home
pub const PREDICATE_FILE: &str = "sbom.json";
/// Docker config mount point, relative to the user home
pub const DOCKER_CONFIG_FILE: &str = ".docker/config.json";

const REDACTED: &str = "***";

/// Registry login with the password already resolved.
#[derive(Debug, Clone, Copy)]
pub struct RegistryLogin<'a> {
    pub username: &'a str,
    pub password: &'a SecretValue,
}

/// A fully rendered cosign invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosignCommand {
    argv: Vec<String>,
    masked: Vec<String>,
}

impl CosignCommand {
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn into_argv(self) -> Vec<String> {
        self.argv
    }

    /// True for the keyless `sh -c` form
    pub fn is_shell(&self) -> bool {
        self.argv.first().map(String::as_str) == Some("sh")
    }

    /// Command line with the registry password masked, for logging.
    pub fn redacted(&self) -> String {
        self.masked.join(" ")
    }
}

/// `cosign sign`
pub fn sign(request: &SigningRequest, registry: Option<RegistryLogin<'_>>) -> CosignCommand {
    let stage = vec![
        COSIGN_BIN.to_string(),
        "sign".to_string(),
        request.digest.clone(),
    ];
    keyed_or_keyless(&request.target.user_home(), request.is_keyless(), stage, registry)
}

/// `cosign attest`
pub fn attest(request: &AttestationRequest, registry: Option<RegistryLogin<'_>>) -> CosignCommand {
    let home = request.signing.target.user_home();
    let stage = vec![
        COSIGN_BIN.to_string(),
        "attest".to_string(),
        "--type".to_string(),
        request.sbom_type.clone(),
        "--predicate".to_string(),
        format!("{}{}", home, PREDICATE_FILE),
        request.signing.digest.clone(),
    ];
    keyed_or_keyless(&home, request.signing.is_keyless(), stage, registry)
}

/// `cosign clean`. Always a single stage, key material is irrelevant here.
pub fn clean(request: &CleanRequest, registry: Option<RegistryLogin<'_>>) -> CosignCommand {
    let mut argv = vec![
        COSIGN_BIN.to_string(),
        "clean".to_string(),
        "--type".to_string(),
        request.clean_type.as_str().to_string(),
        "--force".to_string(),
        request.digest.clone(),
    ];
    let secret_at = append_registry(&mut argv, registry);
    let masked = mask(&argv, secret_at);
    CosignCommand { argv, masked }
}

fn keyed_or_keyless(
    home: &str,
    keyless: bool,
    mut stage: Vec<String>,
    registry: Option<RegistryLogin<'_>>,
) -> CosignCommand {
    stage.push("--key".to_string());
    if keyless {
        stage.push(format!("{}{}.key", home, KEY_PAIR_PREFIX));
    } else {
        stage.push(PRIVATE_KEY_REF.to_string());
    }
    let secret_at = append_registry(&mut stage, registry);

    if !keyless {
        let masked = mask(&stage, secret_at);
        return CosignCommand {
            argv: stage,
            masked,
        };
    }

    let generate = [
        format!("{}=1", EXPERIMENTAL_ENV),
        COSIGN_BIN.to_string(),
        "generate-key-pair".to_string(),
        "--output-key-prefix".to_string(),
        format!("{}{}", home, KEY_PAIR_PREFIX),
    ];
    let generate = shell_join(&generate);
    let quoted: Vec<String> = stage.iter().map(|w| shell_quote(w)).collect();
    let script = format!("{} && {}", generate, quoted.join(" "));
    let masked_script = format!("{} && {}", generate, mask(&quoted, secret_at).join(" "));

    CosignCommand {
        argv: vec!["sh".to_string(), "-c".to_string(), script],
        masked: vec!["sh".to_string(), "-c".to_string(), masked_script],
    }
}

/// Appends the registry flags, returning the index of the password word.
fn append_registry(argv: &mut Vec<String>, registry: Option<RegistryLogin<'_>>) -> Option<usize> {
    let login = registry?;
    argv.extend([
        "--registry-username".to_string(),
        login.username.to_string(),
        "--registry-password".to_string(),
    ]);
    argv.push(login.password.expose().to_string());
    Some(argv.len() - 1)
}

fn mask(argv: &[String], secret_at: Option<usize>) -> Vec<String> {
    let mut masked = argv.to_vec();
    if let Some(word) = secret_at.and_then(|i| masked.get_mut(i)) {
        *word = REDACTED.to_string();
    }
    masked
}

fn shell_join(words: &[String]) -> String {
    words
        .iter()
        .map(|w| shell_quote(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// POSIX single-quote a word unless it only holds characters the shell
/// passes through untouched.
pub fn shell_quote(word: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c);
    if !word.is_empty() && word.chars().all(is_plain) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}
