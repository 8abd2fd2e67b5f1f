// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy engine configuration.

use std::time::Duration;

use serde::Deserialize;

/// Upper bound on a single identity or ownership lookup.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 2_000;

/// Policy configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
	pub lookup_timeout_ms: u64,
	/// Answer a missing referenced record with `not_found` instead of
	/// `forbidden`. Off by default so callers cannot probe other tenants.
	pub reveal_missing_entities: bool,
}

impl PolicyConfig {
	pub fn lookup_timeout(&self) -> Duration {
		Duration::from_millis(self.lookup_timeout_ms)
	}
}

impl Default for PolicyConfig {
	fn default() -> Self {
		Self {
			lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
			reveal_missing_entities: false,
		}
	}
}

/// Policy configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfigLayer {
	#[serde(default)]
	pub lookup_timeout_ms: Option<u64>,
	#[serde(default)]
	pub reveal_missing_entities: Option<bool>,
}

impl PolicyConfigLayer {
	pub fn merge(&mut self, other: PolicyConfigLayer) {
		if other.lookup_timeout_ms.is_some() {
			self.lookup_timeout_ms = other.lookup_timeout_ms;
		}
		if other.reveal_missing_entities.is_some() {
			self.reveal_missing_entities = other.reveal_missing_entities;
		}
	}

	pub fn finalize(self) -> PolicyConfig {
		PolicyConfig {
			lookup_timeout_ms: self.lookup_timeout_ms.unwrap_or(DEFAULT_LOOKUP_TIMEOUT_MS),
			reveal_missing_entities: self.reveal_missing_entities.unwrap_or(false),
		}
	}
}
