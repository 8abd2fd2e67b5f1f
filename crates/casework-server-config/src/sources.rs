// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{DatabaseConfigLayer, LogFormat, LoggingConfigLayer, PolicyConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/casework/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::Parse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: CASEWORK_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl EnvSource {
	/// Build a layer from an arbitrary variable lookup. Empty values count as unset.
	pub fn layer_from<F>(lookup: F) -> Result<ServerConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let vars = Vars(lookup);
		Ok(ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: vars.string("CASEWORK_SERVER_DATABASE_URL"),
				ensure_schema: vars.bool("CASEWORK_SERVER_DATABASE_ENSURE_SCHEMA")?,
			}),
			policy: Some(PolicyConfigLayer {
				lookup_timeout_ms: vars
					.parsed("CASEWORK_SERVER_POLICY_LOOKUP_TIMEOUT_MS", "millisecond count")?,
				reveal_missing_entities: vars
					.bool("CASEWORK_SERVER_POLICY_REVEAL_MISSING_ENTITIES")?,
			}),
			logging: Some(LoggingConfigLayer {
				level: vars.string("CASEWORK_SERVER_LOG_LEVEL"),
				format: vars.parsed::<LogFormat>(
					"CASEWORK_SERVER_LOG_FORMAT",
					"log format (text or json)",
				)?,
			}),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::layer_from(|name| std::env::var(name).ok())
	}
}

struct Vars<F>(F);

impl<F> Vars<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn string(&self, name: &str) -> Option<String> {
		(self.0)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &'static str) -> Result<Option<bool>, ConfigError> {
		let Some(value) = self.string(name) else {
			return Ok(None);
		};
		match value.to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" => Ok(Some(true)),
			"0" | "false" | "no" => Ok(Some(false)),
			_ => Err(ConfigError::InvalidEnv {
				var: name,
				value,
				expected: "boolean",
			}),
		}
	}

	fn parsed<T: FromStr>(
		&self,
		name: &'static str,
		expected: &'static str,
	) -> Result<Option<T>, ConfigError> {
		let Some(value) = self.string(name) else {
			return Ok(None);
		};
		match value.parse() {
			Ok(parsed) => Ok(Some(parsed)),
			Err(_) => Err(ConfigError::InvalidEnv {
				var: name,
				value,
				expected,
			}),
		}
	}
}
