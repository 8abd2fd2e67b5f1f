// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authorization.
//!
//! - **ID newtypes**: Type-safe wrappers around the opaque string ids the
//!   GraphQL layer hands us ([`OrgId`], [`EngagementId`], ...), so an engagement
//!   id can never be passed where a service id is expected
//! - **Role tiers**: the per-organization [`RoleType`] order
//!   (`Viewer < User < Admin`)
//!
//! All ID types serialize transparently as strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Create a new ID from any string-like value.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Borrow the raw id.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}
	};
}

define_id_type!(OrgId, "Unique identifier for an organization.");
define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(EngagementId, "Unique identifier for an engagement.");
define_id_type!(ContactId, "Unique identifier for a contact.");
define_id_type!(ServiceId, "Unique identifier for a service.");
define_id_type!(ServiceAnswerId, "Unique identifier for a service answer.");
define_id_type!(TagId, "Unique identifier for a tag.");

// =============================================================================
// Role Types
// =============================================================================

/// Privilege tier a user holds within one organization.
///
/// Variants are declared lowest to highest. The default is [`RoleType::User`],
/// the lowest "member" tier, which is what an operation requires when its
/// annotation does not name a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
	/// Read-only access to the organization's records.
	Viewer,
	/// Standard member access.
	#[default]
	User,
	/// Manages members and settings.
	Admin,
}

impl RoleType {
	/// Returns all role types, lowest to highest.
	pub fn all() -> &'static [RoleType] {
		&[RoleType::Viewer, RoleType::User, RoleType::Admin]
	}

	/// Position in the total order; higher outranks lower.
	pub fn rank(&self) -> u8 {
		match self {
			RoleType::Viewer => 0,
			RoleType::User => 1,
			RoleType::Admin => 2,
		}
	}
}

impl fmt::Display for RoleType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoleType::Viewer => write!(f, "viewer"),
			RoleType::User => write!(f, "user"),
			RoleType::Admin => write!(f, "admin"),
		}
	}
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role type: {0}")]
pub struct ParseRoleTypeError(pub String);

impl FromStr for RoleType {
	type Err = ParseRoleTypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"viewer" => Ok(RoleType::Viewer),
			"user" => Ok(RoleType::User),
			"admin" => Ok(RoleType::Admin),
			_ => Err(ParseRoleTypeError(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_role_is_user() {
		assert_eq!(RoleType::default(), RoleType::User);
	}

	#[test]
	fn all_is_ordered_by_rank() {
		let ranks: Vec<u8> = RoleType::all().iter().map(RoleType::rank).collect();
		assert_eq!(ranks, vec![0, 1, 2]);
	}

	#[test]
	fn parses_case_insensitively() {
		assert_eq!("ADMIN".parse::<RoleType>(), Ok(RoleType::Admin));
		assert_eq!(" Viewer ".parse::<RoleType>(), Ok(RoleType::Viewer));
		assert!("owner".parse::<RoleType>().is_err());
	}

	#[test]
	fn display_matches_serde_name() {
		for role in RoleType::all() {
			let json = serde_json::to_string(role).unwrap();
			assert_eq!(json, format!("\"{role}\""));
		}
	}

	#[test]
	fn ids_serialize_as_plain_strings() {
		let id = OrgId::new("org1");
		assert_eq!(serde_json::to_string(&id).unwrap(), "\"org1\"");
		assert_eq!(id.to_string(), "org1");
	}
}
