// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ownership strategies.
//!
//! Each [`Strategy`] recognizes one reference shape in an operation's parent or
//! arguments and names a [`Target`]. [`resolve_target`] then walks the lookup
//! chain from that target to the owning organization(s).

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::args::{keys, MalformedArg, OperationArgs, ParentRef};
use crate::gateway::{bounded, Collection, CollectionGateway, GatewayError};
use crate::hierarchy::{is_sufficient, is_sufficient_in_any};
use crate::identity::Identity;
use crate::types::{
	ContactId, EngagementId, OrgId, RoleType, ServiceAnswerId, ServiceId, TagId, UserId,
};

/// What a strategy sees of the operation.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipInput<'a> {
	pub parent: Option<&'a ParentRef>,
	pub args: &'a OperationArgs,
}

impl<'a> OwnershipInput<'a> {
	pub fn new(parent: Option<&'a ParentRef>, args: &'a OperationArgs) -> Self {
		Self { parent, args }
	}
}

/// The record a strategy points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
	Org(OrgId),
	Service(ServiceId),
	Engagement(EngagementId),
	Contact(ContactId),
	ServiceAnswer(ServiceAnswerId),
	User(UserId),
	Tag(TagId),
}

/// The organization(s) that own the targeted resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "org_ids", rename_all = "snake_case")]
pub enum Ownership {
	Single(OrgId),
	/// User-targeted operations: every org the target user holds a role in.
	AnyOf(BTreeSet<OrgId>),
}

impl Ownership {
	/// Whether `identity` holds `required` in the owning organization, or in
	/// any of them for [`Ownership::AnyOf`].
	pub fn permits(&self, identity: &Identity, required: RoleType) -> bool {
		match self {
			Ownership::Single(org_id) => is_sufficient(identity, org_id, required),
			Ownership::AnyOf(org_ids) => is_sufficient_in_any(identity, org_ids, required),
		}
	}

	pub fn org_ids(&self) -> Vec<OrgId> {
		match self {
			Ownership::Single(org_id) => vec![org_id.clone()],
			Ownership::AnyOf(org_ids) => org_ids.iter().cloned().collect(),
		}
	}
}

impl fmt::Display for Ownership {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Ownership::Single(org_id) => write!(f, "{org_id}"),
			Ownership::AnyOf(org_ids) => {
				let ids: Vec<&str> = org_ids.iter().map(OrgId::as_str).collect();
				write!(f, "any of [{}]", ids.join(", "))
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
	#[error("no ownership strategy matches arguments {arg_keys:?} (parent: {})", .parent.as_deref().unwrap_or("none"))]
	NoStrategy {
		arg_keys: Vec<String>,
		parent: Option<String>,
	},

	#[error("malformed reference in argument `{key}`")]
	MalformedReference { key: String },

	#[error("{collection} record not found: {id}")]
	NotFound { collection: Collection, id: String },

	#[error(transparent)]
	Gateway(#[from] GatewayError),
}

impl From<MalformedArg> for ResolutionError {
	fn from(arg: MalformedArg) -> Self {
		ResolutionError::MalformedReference { key: arg.key }
	}
}

/// One recognized reference shape, listed in default precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
	/// The field resolves on an Organization; its id is the owner.
	ParentOrganization,
	/// `orgId` argument, no lookup.
	OrgIdArgument,
	/// `serviceId` argument, one Service lookup.
	ServiceIdArgument,
	/// `engagementId` argument, one Engagement lookup.
	EngagementIdArgument,
	/// `contactId` argument, one Contact lookup.
	ContactIdArgument,
	/// `answerId` argument, ServiceAnswer then Service.
	AnswerIdArgument,
	/// `userId` argument, owners are every org the user belongs to.
	UserIdArgument,
	/// `engagement`, `contact` or `service` input carrying its own `orgId`.
	EmbeddedOrgPayload,
	/// `serviceAnswer` input; its `serviceId` is looked up.
	ServiceAnswerPayload,
	/// `tag` reference; the Tag is looked up by id.
	TagPayload,
}

const EMBEDDED_PAYLOAD_KEYS: [&str; 3] = [keys::ENGAGEMENT, keys::CONTACT, keys::SERVICE];

impl Strategy {
	pub fn name(&self) -> &'static str {
		match self {
			Strategy::ParentOrganization => "parent_organization",
			Strategy::OrgIdArgument => "org_id_argument",
			Strategy::ServiceIdArgument => "service_id_argument",
			Strategy::EngagementIdArgument => "engagement_id_argument",
			Strategy::ContactIdArgument => "contact_id_argument",
			Strategy::AnswerIdArgument => "answer_id_argument",
			Strategy::UserIdArgument => "user_id_argument",
			Strategy::EmbeddedOrgPayload => "embedded_org_payload",
			Strategy::ServiceAnswerPayload => "service_answer_payload",
			Strategy::TagPayload => "tag_payload",
		}
	}

	/// `None` when the shape is not present. `Some(Err(_))` when it is present
	/// but malformed; the caller must deny rather than try the next strategy.
	pub fn matches(&self, input: &OwnershipInput<'_>) -> Option<Result<Target, ResolutionError>> {
		let args = input.args;
		let matched = match self {
			Strategy::ParentOrganization => match input.parent {
				Some(ParentRef::Organization { id }) => Ok(Target::Org(id.clone())),
				_ => return None,
			},
			Strategy::OrgIdArgument => args.id_arg(keys::ORG_ID)?.map(|id| Target::Org(id.into())),
			Strategy::ServiceIdArgument => args
				.id_arg(keys::SERVICE_ID)?
				.map(|id| Target::Service(id.into())),
			Strategy::EngagementIdArgument => args
				.id_arg(keys::ENGAGEMENT_ID)?
				.map(|id| Target::Engagement(id.into())),
			Strategy::ContactIdArgument => args
				.id_arg(keys::CONTACT_ID)?
				.map(|id| Target::Contact(id.into())),
			Strategy::AnswerIdArgument => args
				.id_arg(keys::ANSWER_ID)?
				.map(|id| Target::ServiceAnswer(id.into())),
			Strategy::UserIdArgument => args.id_arg(keys::USER_ID)?.map(|id| Target::User(id.into())),
			Strategy::EmbeddedOrgPayload => {
				let payload = EMBEDDED_PAYLOAD_KEYS
					.iter()
					.find_map(|key| args.payload(key))?;
				payload
					.and_then(|p| p.required_id(keys::ORG_ID))
					.map(|id| Target::Org(id.into()))
			}
			Strategy::ServiceAnswerPayload => args
				.payload(keys::SERVICE_ANSWER)?
				.and_then(|p| p.required_id(keys::SERVICE_ID))
				.map(|id| Target::Service(id.into())),
			Strategy::TagPayload => args.reference(keys::TAG)?.map(|id| Target::Tag(id.into())),
		};
		Some(matched.map_err(ResolutionError::from))
	}
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Walk the lookup chain from `target` to its owning organization(s).
///
/// Absent records become [`ResolutionError::NotFound`]. Every lookup is bounded
/// by `timeout`.
pub async fn resolve_target(
	target: &Target,
	gateway: &dyn CollectionGateway,
	timeout: Duration,
) -> Result<Ownership, ResolutionError> {
	match target {
		Target::Org(org_id) => Ok(Ownership::Single(org_id.clone())),
		Target::Service(id) => lookup_service(gateway, id, timeout).await,
		Target::Engagement(id) => {
			let record = bounded(Collection::Engagements, timeout, gateway.get_engagement(id))
				.await?
				.ok_or_else(|| not_found(Collection::Engagements, id.as_str()))?;
			Ok(Ownership::Single(record.org_id))
		}
		Target::Contact(id) => {
			let record = bounded(Collection::Contacts, timeout, gateway.get_contact(id))
				.await?
				.ok_or_else(|| not_found(Collection::Contacts, id.as_str()))?;
			Ok(Ownership::Single(record.org_id))
		}
		Target::Tag(id) => {
			let record = bounded(Collection::Tags, timeout, gateway.get_tag(id))
				.await?
				.ok_or_else(|| not_found(Collection::Tags, id.as_str()))?;
			Ok(Ownership::Single(record.org_id))
		}
		Target::ServiceAnswer(id) => {
			let answer = bounded(
				Collection::ServiceAnswers,
				timeout,
				gateway.get_service_answer(id),
			)
			.await?
			.ok_or_else(|| not_found(Collection::ServiceAnswers, id.as_str()))?;
			lookup_service(gateway, &answer.service_id, timeout).await
		}
		Target::User(id) => {
			let user = bounded(Collection::Users, timeout, gateway.get_user(id))
				.await?
				.ok_or_else(|| not_found(Collection::Users, id.as_str()))?;
			Ok(Ownership::AnyOf(
				user.roles.into_iter().map(|role| role.org_id).collect(),
			))
		}
	}
}

async fn lookup_service(
	gateway: &dyn CollectionGateway,
	id: &ServiceId,
	timeout: Duration,
) -> Result<Ownership, ResolutionError> {
	let record = bounded(Collection::Services, timeout, gateway.get_service(id))
		.await?
		.ok_or_else(|| not_found(Collection::Services, id.as_str()))?;
	Ok(Ownership::Single(record.org_id))
}

fn not_found(collection: Collection, id: &str) -> ResolutionError {
	ResolutionError::NotFound {
		collection,
		id: id.to_string(),
	}
}
