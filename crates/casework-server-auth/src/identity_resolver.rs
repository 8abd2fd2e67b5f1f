// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turns request headers into an [`Identity`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use tracing::instrument;

use crate::error::AuthError;
use crate::gateway::{bounded, Collection, GatewayError};
use crate::identity::Identity;
use crate::middleware::extract_bearer_token_from_headers;
use crate::token::BearerToken;

/// Loads the identity a bearer token belongs to.
///
/// `Ok(None)` means the token is well formed but does not resolve to a live
/// identity (unknown, expired or revoked).
#[async_trait]
pub trait IdentityLoader: Send + Sync {
	async fn load_identity(&self, token: &BearerToken) -> Result<Option<Identity>, GatewayError>;
}

#[derive(Clone)]
pub struct IdentityResolver {
	loader: Arc<dyn IdentityLoader>,
	timeout: Duration,
}

impl IdentityResolver {
	pub fn new(loader: Arc<dyn IdentityLoader>, timeout: Duration) -> Self {
		Self { loader, timeout }
	}

	/// Resolve the caller from the `Authorization` header.
	#[instrument(skip_all, fields(user_id))]
	pub async fn resolve(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
		let token = extract_bearer_token_from_headers(headers)?;
		let identity = self.load(&token).await?;
		tracing::Span::current().record("user_id", identity.id.as_str());
		Ok(identity)
	}

	/// Load the identity for an already extracted token.
	pub async fn load(&self, token: &BearerToken) -> Result<Identity, AuthError> {
		let loaded = bounded(
			Collection::AccessTokens,
			self.timeout,
			self.loader.load_identity(token),
		)
		.await
		.map_err(|e| {
			tracing::warn!(error = %e, "identity lookup failed");
			AuthError::LookupFailed(e.to_string())
		})?;

		loaded.ok_or_else(|| {
			tracing::debug!(token_hash = %token.hash(), "token does not resolve to an identity");
			AuthError::AuthenticationRequired
		})
	}
}

impl std::fmt::Debug for IdentityResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IdentityResolver")
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}
