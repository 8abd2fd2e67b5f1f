// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only record lookups the policy engine depends on.
//!
//! The engine never writes. Each lookup returns `Ok(None)` when the record does
//! not exist; the engine turns that into a denial, never a pass-through.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Role;
use crate::types::{
	ContactId, EngagementId, OrgId, ServiceAnswerId, ServiceId, TagId, UserId,
};

/// Collections the engine reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
	Services,
	Engagements,
	Contacts,
	ServiceAnswers,
	Tags,
	Users,
	AccessTokens,
}

impl fmt::Display for Collection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Collection::Services => "services",
			Collection::Engagements => "engagements",
			Collection::Contacts => "contacts",
			Collection::ServiceAnswers => "service_answers",
			Collection::Tags => "tags",
			Collection::Users => "users",
			Collection::AccessTokens => "access_tokens",
		};
		f.write_str(s)
	}
}

/// A record that carries its owning organization directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedRecord<I> {
	pub id: I,
	pub org_id: OrgId,
}

/// A service answer; ownership is one hop away through its service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAnswerRecord {
	pub id: ServiceAnswerId,
	pub service_id: ServiceId,
}

/// A user together with every organization role it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
	pub id: UserId,
	pub roles: Vec<Role>,
}

/// Lookup failures. Absence is not an error; see `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
	#[error("{collection} lookup timed out")]
	Timeout { collection: Collection },

	#[error("gateway unavailable: {0}")]
	Unavailable(String),
}

#[async_trait]
pub trait CollectionGateway: Send + Sync {
	async fn get_service(&self, id: &ServiceId)
		-> Result<Option<OwnedRecord<ServiceId>>, GatewayError>;
	async fn get_engagement(
		&self,
		id: &EngagementId,
	) -> Result<Option<OwnedRecord<EngagementId>>, GatewayError>;
	async fn get_contact(&self, id: &ContactId)
		-> Result<Option<OwnedRecord<ContactId>>, GatewayError>;
	async fn get_tag(&self, id: &TagId) -> Result<Option<OwnedRecord<TagId>>, GatewayError>;
	async fn get_service_answer(
		&self,
		id: &ServiceAnswerId,
	) -> Result<Option<ServiceAnswerRecord>, GatewayError>;
	async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, GatewayError>;
}

/// Run a lookup with an upper bound on how long it may take.
///
/// An elapsed deadline drops the lookup future and yields
/// [`GatewayError::Timeout`].
pub async fn bounded<T, F>(collection: Collection, timeout: Duration, lookup: F) -> Result<T, GatewayError>
where
	F: Future<Output = Result<T, GatewayError>>,
{
	match tokio::time::timeout(timeout, lookup).await {
		Ok(result) => result,
		Err(_) => {
			tracing::warn!(%collection, timeout_ms = timeout.as_millis() as u64, "lookup timed out");
			Err(GatewayError::Timeout { collection })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn bounded_passes_through_results() {
		let result = bounded(Collection::Tags, Duration::from_secs(1), async {
			Ok::<_, GatewayError>(Some(3))
		})
		.await;
		assert_eq!(result, Ok(Some(3)));
	}

	#[tokio::test(start_paused = true)]
	async fn bounded_times_out_pending_lookup() {
		let result: Result<Option<u8>, _> = bounded(
			Collection::Engagements,
			Duration::from_millis(50),
			futures::future::pending(),
		)
		.await;
		assert_eq!(result, Err(GatewayError::Timeout {
				collection: Collection::Engagements
			}));
	}

	#[test]
	fn collection_display_is_snake_case() {
		assert_eq!(Collection::ServiceAnswers.to_string(), "service_answers");
	}
}
