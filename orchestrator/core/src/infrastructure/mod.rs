// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod runtime;
pub mod secrets_manager;

pub use runtime::DockerRuntime;
pub use secrets_manager::SecretsManager;
