// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy engine.
//!
//! An evaluation moves from pending to exactly one of allowed or denied and
//! never revisits that outcome. Denials are returned as values; only
//! [`PolicyEngine::guard`] and [`Decision::into_result`] turn them into
//! [`AuthError`]s for the transport boundary.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::args::{OperationArgs, ParentRef};
use super::operation::Operation;
use super::ownership::{Ownership, OwnershipInput, ResolutionError, Strategy};
use super::registry::StrategyRegistry;
use crate::audit::AuthorizationAudit;
use crate::error::AuthError;
use crate::gateway::{Collection, CollectionGateway};
use crate::identity::Identity;
use crate::identity_resolver::{IdentityLoader, IdentityResolver};
use crate::types::{RoleType, UserId};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(2000);

/// Tunables for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySettings {
	/// Upper bound for each identity or ownership lookup.
	pub lookup_timeout: Duration,
	/// Report dangling references as not found instead of forbidden.
	pub reveal_missing_entities: bool,
}

impl Default for PolicySettings {
	fn default() -> Self {
		Self {
			lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
			reveal_missing_entities: false,
		}
	}
}

/// Proof that an operation was allowed, handed to the protected body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
	pub user_id: UserId,
	pub ownership: Ownership,
	pub required: RoleType,
	pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
	Unauthenticated {
		malformed_credential: bool,
	},
	Forbidden {
		user_id: UserId,
		ownership: Ownership,
		required: RoleType,
	},
	EntityNotFound {
		user_id: UserId,
		collection: Collection,
		id: String,
		required: RoleType,
	},
	MalformedReference {
		key: String,
	},
	PolicyResolutionFailure {
		detail: String,
	},
	LookupFailed {
		detail: String,
	},
}

impl DenyReason {
	pub fn code(&self) -> &'static str {
		match self {
			DenyReason::Unauthenticated { .. } => "unauthenticated",
			DenyReason::Forbidden { .. } => "forbidden",
			DenyReason::EntityNotFound { .. } => "entity_not_found",
			DenyReason::MalformedReference { .. } => "malformed_reference",
			DenyReason::PolicyResolutionFailure { .. } => "policy_resolution_failure",
			DenyReason::LookupFailed { .. } => "lookup_failed",
		}
	}

	/// Translate into the transport error taxonomy.
	///
	/// Unless `reveal_missing_entities` is set, a dangling reference is reported
	/// exactly like an insufficient role so callers cannot probe for records in
	/// other organizations.
	pub fn into_error(self, reveal_missing_entities: bool) -> AuthError {
		match self {
			DenyReason::Unauthenticated {
				malformed_credential: true,
			} => AuthError::MalformedCredential,
			DenyReason::Unauthenticated { .. } => AuthError::AuthenticationRequired,
			DenyReason::Forbidden { user_id, required, .. } => {
				AuthError::Forbidden { user_id, required }
			}
			DenyReason::EntityNotFound { collection, id, .. } if reveal_missing_entities => {
				AuthError::ResourceNotFound { collection, id }
			}
			DenyReason::EntityNotFound { user_id, required, .. } => {
				AuthError::Forbidden { user_id, required }
			}
			DenyReason::MalformedReference { key } => AuthError::MalformedReference { key },
			DenyReason::PolicyResolutionFailure { detail } => {
				AuthError::PolicyResolutionFailure { detail }
			}
			DenyReason::LookupFailed { detail } => AuthError::LookupFailed(detail),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Allow(Grant),
	Deny(DenyReason),
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow(_))
	}

	pub fn into_result(self, settings: &PolicySettings) -> Result<Grant, AuthError> {
		match self {
			Decision::Allow(grant) => Ok(grant),
			Decision::Deny(reason) => Err(reason.into_error(settings.reveal_missing_entities)),
		}
	}
}

/// Organization-scoped authorization.
///
/// Cheap to clone; the registry, gateway and identity loader are shared.
#[derive(Clone)]
pub struct PolicyEngine {
	registry: Arc<StrategyRegistry>,
	gateway: Arc<dyn CollectionGateway>,
	identities: IdentityResolver,
	settings: PolicySettings,
}

impl PolicyEngine {
	pub fn new(
		registry: StrategyRegistry,
		gateway: Arc<dyn CollectionGateway>,
		loader: Arc<dyn IdentityLoader>,
		settings: PolicySettings,
	) -> Self {
		Self {
			registry: Arc::new(registry),
			gateway,
			identities: IdentityResolver::new(loader, settings.lookup_timeout),
			settings,
		}
	}

	pub fn settings(&self) -> &PolicySettings {
		&self.settings
	}

	/// Decide whether `identity` may act on the resource named by `parent` and
	/// `args` with at least the `required` role.
	#[instrument(skip(self, parent, args, identity), fields(user_id))]
	pub async fn authorize(
		&self,
		required: RoleType,
		parent: Option<&ParentRef>,
		args: &OperationArgs,
		identity: Option<&Identity>,
	) -> Decision {
		let Some(identity) = identity else {
			tracing::info!("authorization denied: no identity");
			return Decision::Deny(DenyReason::Unauthenticated {
				malformed_credential: false,
			});
		};
		tracing::Span::current().record("user_id", identity.id.as_str());

		let input = OwnershipInput::new(parent, args);
		let resolution = match self
			.registry
			.resolve(&input, self.gateway.as_ref(), self.settings.lookup_timeout)
			.await
		{
			Ok(resolution) => resolution,
			Err(err) => return Decision::Deny(resolution_denied(identity, required, err)),
		};

		if resolution.ownership.permits(identity, required) {
			tracing::debug!(
				user_id = %identity.id,
				strategy = %resolution.strategy,
				orgs = %resolution.ownership,
				%required,
				"authorization allowed"
			);
			Decision::Allow(Grant {
				user_id: identity.id.clone(),
				ownership: resolution.ownership,
				required,
				strategy: resolution.strategy,
			})
		} else {
			tracing::info!(
				user_id = %identity.id,
				strategy = %resolution.strategy,
				orgs = %resolution.ownership,
				%required,
				"authorization denied: insufficient role"
			);
			Decision::Deny(DenyReason::Forbidden {
				user_id: identity.id.clone(),
				ownership: resolution.ownership,
				required,
			})
		}
	}

	/// Resolve the caller from the operation's headers, then [`authorize`].
	///
	/// Ownership is never resolved for an unauthenticated caller.
	///
	/// [`authorize`]: PolicyEngine::authorize
	#[instrument(skip(self, operation), fields(operation = %operation.name))]
	pub async fn authorize_operation(&self, operation: &Operation, required: RoleType) -> Decision {
		let identity = match self.identities.resolve(&operation.headers).await {
			Ok(identity) => identity,
			Err(err) => {
				let reason = match err {
					AuthError::LookupFailed(detail) => DenyReason::LookupFailed { detail },
					AuthError::MalformedCredential => DenyReason::Unauthenticated {
						malformed_credential: true,
					},
					_ => DenyReason::Unauthenticated {
						malformed_credential: false,
					},
				};
				tracing::info!(reason = reason.code(), "authorization denied: unauthenticated");
				let decision = Decision::Deny(reason);
				AuthorizationAudit::from_decision(&operation.name, None, required, &decision).emit();
				return decision;
			}
		};

		let decision = self
			.authorize(
				required,
				operation.parent.as_ref(),
				&operation.args,
				Some(&identity),
			)
			.await;
		AuthorizationAudit::from_decision(&operation.name, Some(&identity.id), required, &decision)
			.emit();
		decision
	}

	/// Run `body` only if the operation is allowed.
	///
	/// On deny `body` is never called, so none of its side effects can happen.
	pub async fn guard<T, F, Fut>(
		&self,
		operation: &Operation,
		required: RoleType,
		body: F,
	) -> Result<T, AuthError>
	where
		F: FnOnce(Grant) -> Fut,
		Fut: Future<Output = T>,
	{
		let grant = self
			.authorize_operation(operation, required)
			.await
			.into_result(&self.settings)?;
		Ok(body(grant).await)
	}

	pub fn deny_error(&self, reason: DenyReason) -> AuthError {
		reason.into_error(self.settings.reveal_missing_entities)
	}
}

impl std::fmt::Debug for PolicyEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PolicyEngine")
			.field("registry", &self.registry)
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

fn resolution_denied(identity: &Identity, required: RoleType, err: ResolutionError) -> DenyReason {
	match err {
		ResolutionError::NoStrategy { .. } => {
			let detail = err.to_string();
			tracing::error!(
				user_id = %identity.id,
				%detail,
				"authorization policy resolution failure"
			);
			DenyReason::PolicyResolutionFailure { detail }
		}
		ResolutionError::MalformedReference { key } => {
			tracing::info!(user_id = %identity.id, %key, "authorization denied: malformed reference");
			DenyReason::MalformedReference { key }
		}
		ResolutionError::NotFound { collection, id } => {
			tracing::info!(
				user_id = %identity.id,
				%collection,
				%id,
				%required,
				"authorization denied: referenced record not found"
			);
			DenyReason::EntityNotFound {
				user_id: identity.id.clone(),
				collection,
				id,
				required,
			}
		}
		ResolutionError::Gateway(err) => {
			tracing::warn!(user_id = %identity.id, error = %err, "authorization lookup failed");
			DenyReason::LookupFailed {
				detail: err.to_string(),
			}
		}
	}
}
