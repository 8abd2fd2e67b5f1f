// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit records for authorization decisions.
//!
//! One [`AuthorizationAudit`] is emitted per evaluated operation on the
//! [`AUDIT_TARGET`] tracing target, so operators can route it to a dedicated
//! sink with an `EnvFilter` directive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::{Decision, DenyReason};
use crate::types::{OrgId, RoleType, UserId};

/// Tracing target audit events are emitted on.
pub const AUDIT_TARGET: &str = "casework::audit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
	Allowed,
	Denied,
}

impl std::fmt::Display for AuditOutcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AuditOutcome::Allowed => write!(f, "allowed"),
			AuditOutcome::Denied => write!(f, "denied"),
		}
	}
}

/// A single authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationAudit {
	/// Unique identifier for this audit entry.
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	/// Name of the protected operation.
	pub operation: String,
	/// The caller, when one was resolved.
	pub user_id: Option<UserId>,
	pub outcome: AuditOutcome,
	/// Owning organizations, when ownership was resolved.
	pub org_ids: Vec<OrgId>,
	pub required: RoleType,
	/// Deny reason code; `None` when allowed.
	pub reason: Option<String>,
}

impl AuthorizationAudit {
	pub fn from_decision(
		operation: &str,
		user_id: Option<&UserId>,
		required: RoleType,
		decision: &Decision,
	) -> Self {
		let (outcome, org_ids, reason) = match decision {
			Decision::Allow(grant) => (AuditOutcome::Allowed, grant.ownership.org_ids(), None),
			Decision::Deny(reason) => {
				let org_ids = match reason {
					DenyReason::Forbidden { ownership, .. } => ownership.org_ids(),
					_ => Vec::new(),
				};
				(AuditOutcome::Denied, org_ids, Some(reason.code().to_string()))
			}
		};

		Self {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			operation: operation.to_string(),
			user_id: user_id.cloned(),
			outcome,
			org_ids,
			required,
			reason,
		}
	}

	pub fn emit(&self) {
		let user_id = self.user_id.as_ref().map(UserId::as_str).unwrap_or("-");
		let org_ids: Vec<&str> = self.org_ids.iter().map(OrgId::as_str).collect();
		tracing::info!(
			target: AUDIT_TARGET,
			audit_id = %self.id,
			operation = %self.operation,
			user_id,
			outcome = %self.outcome,
			org_ids = ?org_ids,
			required = %self.required,
			reason = self.reason.as_deref().unwrap_or("-"),
			"authorization decision"
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::{Grant, Ownership, Strategy};

	#[test]
	fn allowed_decision_records_orgs() {
		let decision = Decision::Allow(Grant {
			user_id: UserId::new("alice"),
			ownership: Ownership::Single(OrgId::new("org1")),
			required: RoleType::User,
			strategy: Strategy::OrgIdArgument,
		});
		let audit = AuthorizationAudit::from_decision(
			"updateEngagement",
			Some(&UserId::new("alice")),
			RoleType::User,
			&decision,
		);
		assert_eq!(audit.outcome, AuditOutcome::Allowed);
		assert_eq!(audit.org_ids, vec![OrgId::new("org1")]);
		assert_eq!(audit.reason, None);
	}

	#[test]
	fn denied_decision_records_reason_code() {
		let decision = Decision::Deny(DenyReason::Unauthenticated {
			malformed_credential: true,
		});
		let audit = AuthorizationAudit::from_decision("me", None, RoleType::Viewer, &decision);
		assert_eq!(audit.outcome, AuditOutcome::Denied);
		assert_eq!(audit.reason.as_deref(), Some("unauthenticated"));
		assert!(audit.user_id.is_none());
	}

	#[test]
	fn serializes_snake_case() {
		let decision = Decision::Deny(DenyReason::LookupFailed {
			detail: "timeout".into(),
		});
		let audit = AuthorizationAudit::from_decision("tag", None, RoleType::User, &decision);
		let json = serde_json::to_value(&audit).unwrap();
		assert_eq!(json["outcome"], "denied");
		assert_eq!(json["required"], "user");
		assert_eq!(json["reason"], "lookup_failed");
	}
}
