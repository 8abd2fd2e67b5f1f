// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization-scoped authorization for Casework.
//!
//! This crate provides:
//! - Typed ids and the per-organization role order (`Viewer < User < Admin`)
//! - Bearer credential extraction and identity resolution
//! - The ownership strategy chain that maps an operation to its owning
//!   organization(s)
//! - The policy engine, its tower guard layer and audit records
//!
//! Storage is reached only through the [`CollectionGateway`] and
//! [`IdentityLoader`] traits; `casework-server-db` implements both over SQLite.
//!
//! # Security Considerations
//!
//! - Every path fails closed: missing data, lookup errors and timeouts deny
//! - Bearer tokens are zeroized on drop and redacted in `Debug`/`Display`
//! - Dangling references are reported as forbidden unless configured otherwise

pub mod audit;
pub mod error;
pub mod gateway;
pub mod hierarchy;
pub mod identity;
pub mod identity_resolver;
pub mod middleware;
pub mod policy;
pub mod token;
pub mod types;

#[cfg(test)]
mod testing;

pub use audit::{AuditOutcome, AuthorizationAudit, AUDIT_TARGET};
pub use error::{AuthError, ErrorBody};
pub use gateway::{
	bounded, Collection, CollectionGateway, GatewayError, OwnedRecord, ServiceAnswerRecord,
	UserRecord,
};
pub use hierarchy::{is_sufficient, is_sufficient_in_any, meets_or_exceeds};
pub use identity::{Identity, Role};
pub use identity_resolver::{IdentityLoader, IdentityResolver};
pub use middleware::{extract_bearer_token, extract_bearer_token_from_headers};
pub use policy::{
	Decision, DenyReason, Grant, Operation, OperationArgs, Ownership, ParentRef, PolicyEngine,
	PolicySettings, RequireOrgRole, Strategy, StrategyRegistry,
};
pub use token::{hash_token, BearerToken};
pub use types::{
	ContactId, EngagementId, OrgId, ParseRoleTypeError, RoleType, ServiceAnswerId, ServiceId,
	TagId, UserId,
};
