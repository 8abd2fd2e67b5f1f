// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Casework server.
//!
//! This crate provides:
//! - Layered configuration from defaults, a TOML file and the environment
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`CASEWORK_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use casework_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("lookup timeout: {:?}", config.policy.lookup_timeout());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub policy: PolicyConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`CASEWORK_SERVER_*`)
/// 2. Config file (`/etc/casework/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let policy = layer.policy.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&database, &policy)?;

	info!(
		database = %database.url,
		ensure_schema = database.ensure_schema,
		lookup_timeout_ms = policy.lookup_timeout_ms,
		reveal_missing_entities = policy.reveal_missing_entities,
		log_level = %logging.level,
		log_format = %logging.format,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		database,
		policy,
		logging,
	})
}

fn validate_config(database: &DatabaseConfig, policy: &PolicyConfig) -> Result<(), ConfigError> {
	database.validate()?;

	if policy.lookup_timeout_ms == 0 {
		return Err(ConfigError::Invalid(
			"policy.lookup_timeout_ms must be greater than zero; a zero timeout denies every request"
				.to_string(),
		));
	}

	Ok(())
}
