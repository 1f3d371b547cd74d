// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Cosign orchestrator core
//!
//! Signs, attests and cleans container image digests by running the
//! `cosign` CLI inside a throwaway container.
//!
//! # Architecture
//!
//! - **domain:** requests, secrets, command builder, execution environment, configuration
//! - **application:** the sign / attest / clean use cases
//! - **infrastructure:** Docker runtime and secret resolution

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
