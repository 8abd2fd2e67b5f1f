// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authenticated caller and the roles it holds.
//!
//! An [`Identity`] is loaded once per request from the bearer credential and is
//! immutable for the rest of that request.

use serde::{Deserialize, Serialize};

use crate::types::{OrgId, RoleType, UserId};

/// A role assignment: the tier a user holds in one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
	pub org_id: OrgId,
	pub role_type: RoleType,
}

impl Role {
	pub fn new(org_id: impl Into<OrgId>, role_type: RoleType) -> Self {
		Self {
			org_id: org_id.into(),
			role_type,
		}
	}
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub id: UserId,
	pub roles: Vec<Role>,
}

impl Identity {
	/// Creates an identity with no roles.
	pub fn new(id: impl Into<UserId>) -> Self {
		Self {
			id: id.into(),
			roles: Vec::new(),
		}
	}

	/// Builder: add a role assignment.
	pub fn with_role(mut self, org_id: impl Into<OrgId>, role_type: RoleType) -> Self {
		self.roles.push(Role::new(org_id, role_type));
		self
	}

	/// Returns the role held in `org_id`, if any.
	///
	/// One role per organization is expected; if storage ever yields more than
	/// one, the highest wins.
	pub fn role_in(&self, org_id: &OrgId) -> Option<RoleType> {
		self
			.roles
			.iter()
			.filter(|r| &r.org_id == org_id)
			.map(|r| r.role_type)
			.max_by_key(RoleType::rank)
	}
}
