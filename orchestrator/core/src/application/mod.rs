// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod cosign_service;

// Re-export use cases for convenience
pub use cosign_service::{CosignError, CosignUseCase, StandardCosignService};
