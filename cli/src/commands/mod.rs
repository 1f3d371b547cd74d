// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for cosignctl

pub mod args;
pub mod attest;
pub mod clean;
pub mod config;
pub mod sign;

pub use self::attest::AttestCommand;
pub use self::clean::CleanCommand;
pub use self::config::ConfigCommand;
pub use self::sign::SignCommand;
