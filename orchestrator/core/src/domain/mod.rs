// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Request value objects and the rules that turn them into cosign invocations

pub mod command;
pub mod config;
pub mod request;
pub mod runtime;
pub mod secret;
