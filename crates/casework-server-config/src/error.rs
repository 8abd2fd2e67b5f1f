// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

/// Failure to produce a usable [`ServerConfig`](crate::ServerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// An environment variable is set but cannot be parsed.
	#[error("{var}={value:?} is not a valid {expected}")]
	InvalidEnv {
		var: &'static str,
		value: String,
		expected: &'static str,
	},

	#[error("cannot read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("cannot parse {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Values parsed but are unusable together or on their own.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}
