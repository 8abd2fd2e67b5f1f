// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::Collection;
use crate::types::{RoleType, UserId};

/// Errors surfaced to the transport boundary when an operation is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
	// =========================================================================
	// Authentication Errors
	// =========================================================================
	/// No credential was provided, or it does not resolve to a live identity.
	#[error("authentication required")]
	AuthenticationRequired,

	/// The `Authorization` header is present but is not `Bearer <token>`.
	#[error("malformed credential")]
	MalformedCredential,

	// =========================================================================
	// Authorization Errors
	// =========================================================================
	/// Carries no organization or record: a dangling reference and a record
	/// owned by another organization must be indistinguishable to the caller.
	#[error("user {user_id} lacks role {required}")]
	Forbidden { user_id: UserId, required: RoleType },

	/// Only produced when missing entities are revealed to callers.
	#[error("{collection} record not found: {id}")]
	ResourceNotFound { collection: Collection, id: String },

	#[error("malformed reference in argument `{key}`")]
	MalformedReference { key: String },

	// =========================================================================
	// Infrastructure Errors
	// =========================================================================
	/// No ownership strategy matched the operation.
	#[error("no authorization policy resolves ownership: {detail}")]
	PolicyResolutionFailure { detail: String },

	#[error("authorization lookup failed: {0}")]
	LookupFailed(String),
}

impl AuthError {
	/// Machine-readable error code.
	pub fn code(&self) -> &'static str {
		match self {
			AuthError::AuthenticationRequired | AuthError::MalformedCredential => "unauthenticated",
			AuthError::Forbidden { .. } => "forbidden",
			AuthError::ResourceNotFound { .. } => "not_found",
			AuthError::MalformedReference { .. } => "malformed_reference",
			AuthError::PolicyResolutionFailure { .. } => "policy_resolution_failure",
			AuthError::LookupFailed(_) => "lookup_failed",
		}
	}

	/// Returns true if this error should be logged at error level.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			AuthError::PolicyResolutionFailure { .. } | AuthError::LookupFailed(_)
		)
	}

	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			// 400 Bad Request
			AuthError::MalformedReference { .. } => 400,

			// 401 Unauthorized
			AuthError::AuthenticationRequired | AuthError::MalformedCredential => 401,

			// 403 Forbidden
			AuthError::Forbidden { .. } => 403,

			// 404 Not Found
			AuthError::ResourceNotFound { .. } => 404,

			// 500 Internal Server Error
			AuthError::PolicyResolutionFailure { .. } => 500,

			// 503 Service Unavailable
			AuthError::LookupFailed(_) => 503,
		}
	}

	/// Body suitable for returning to the caller.
	///
	/// Internal errors get a generic message so storage details stay in the
	/// logs.
	pub fn to_body(&self) -> ErrorBody {
		let message = match self {
			AuthError::Forbidden { required, .. } => format!("forbidden: requires {required} role"),
			_ if self.is_internal() => "internal authorization error".to_string(),
			_ => self.to_string(),
		};
		ErrorBody {
			code: self.code().to_string(),
			message,
		}
	}
}

/// Structured error returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	pub code: String,
	pub message: String,
}
