// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `[database]`: where ownership records, users and access tokens live.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_URL: &str = "sqlite:./casework.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	/// Create missing tables at startup. Turn off when the schema is owned by
	/// the application that writes the records.
	pub ensure_schema: bool,
}

impl DatabaseConfig {
	/// Only SQLite URLs are accepted; the gateway speaks SQLite.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.url.starts_with("sqlite:") {
			return Err(ConfigError::Invalid(format!(
				"database.url must be a sqlite: URL, got {:?}",
				self.url
			)));
		}
		Ok(())
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub ensure_schema: Option<bool>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		self.url = other.url.or(self.url.take());
		self.ensure_schema = other.ensure_schema.or(self.ensure_schema);
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
			ensure_schema: self.ensure_schema.unwrap_or(true),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_local_file_with_schema() {
		let config = DatabaseConfig::default();
		assert_eq!(config.url, "sqlite:./casework.db");
		assert!(config.ensure_schema);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn non_sqlite_url_is_rejected() {
		let config = DatabaseConfigLayer {
			url: Some("postgres://localhost/casework".to_string()),
			ensure_schema: None,
		}
		.finalize();
		assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
	}

	#[test]
	fn schema_switch_survives_merge_without_override() {
		let mut base = DatabaseConfigLayer {
			url: None,
			ensure_schema: Some(false),
		};
		base.merge(DatabaseConfigLayer {
			url: Some("sqlite::memory:".to_string()),
			ensure_schema: None,
		});
		let config = base.finalize();
		assert_eq!(config.url, "sqlite::memory:");
		assert!(!config.ensure_schema);
	}
}
