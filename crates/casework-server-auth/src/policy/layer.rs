// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tower layer that guards an operation handler with an organization role.
//!
//! ```ignore
//! let handler = ServiceBuilder::new()
//!     .layer(RequireOrgRole::new(engine.clone(), RoleType::Admin))
//!     .service(update_engagement);
//! ```

use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::engine::{Decision, PolicyEngine};
use super::operation::Operation;
use crate::error::AuthError;
use crate::types::RoleType;

/// Requires the caller to hold at least `required` in the organization that
/// owns the operation's target.
#[derive(Debug, Clone)]
pub struct RequireOrgRole {
	engine: PolicyEngine,
	required: RoleType,
}

impl RequireOrgRole {
	pub fn new(engine: PolicyEngine, required: RoleType) -> Self {
		Self { engine, required }
	}

	/// Requires the default member tier.
	pub fn member(engine: PolicyEngine) -> Self {
		Self::new(engine, RoleType::default())
	}

	pub fn viewer(engine: PolicyEngine) -> Self {
		Self::new(engine, RoleType::Viewer)
	}

	pub fn admin(engine: PolicyEngine) -> Self {
		Self::new(engine, RoleType::Admin)
	}
}

impl<S> Layer<S> for RequireOrgRole {
	type Service = RequireOrgRoleService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireOrgRoleService {
			inner,
			engine: self.engine.clone(),
			required: self.required,
		}
	}
}

/// Service wrapper for [`RequireOrgRole`] layer.
#[derive(Debug, Clone)]
pub struct RequireOrgRoleService<S> {
	inner: S,
	engine: PolicyEngine,
	required: RoleType,
}

impl<S> Service<Operation> for RequireOrgRoleService<S>
where
	S: Service<Operation> + Clone + Send + 'static,
	S::Future: Send,
	S::Error: From<AuthError>,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut operation: Operation) -> Self::Future {
		// The ready inner service is moved into the future; leave a fresh clone.
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		let engine = self.engine.clone();
		let required = self.required;

		Box::pin(async move {
			match engine.authorize_operation(&operation, required).await {
				Decision::Allow(grant) => {
					operation.attach_grant(grant);
					inner.call(operation).await
				}
				Decision::Deny(reason) => Err(engine.deny_error(reason).into()),
			}
		})
	}
}
