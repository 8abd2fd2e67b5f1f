// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory fixtures for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::gateway::{
	Collection, CollectionGateway, GatewayError, OwnedRecord, ServiceAnswerRecord, UserRecord,
};
use crate::identity::{Identity, Role};
use crate::identity_resolver::IdentityLoader;
use crate::token::BearerToken;
use crate::types::{
	ContactId, EngagementId, OrgId, RoleType, ServiceAnswerId, ServiceId, TagId, UserId,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
	#[default]
	Normal,
	Unavailable,
	Stalled,
}

/// Gateway backed by hash maps that counts lookups per collection.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
	services: HashMap<String, OrgId>,
	engagements: HashMap<String, OrgId>,
	contacts: HashMap<String, OrgId>,
	tags: HashMap<String, OrgId>,
	service_answers: HashMap<String, ServiceId>,
	users: HashMap<String, Vec<Role>>,
	lookups: Mutex<HashMap<Collection, usize>>,
	mode: Mode,
}

impl InMemoryGateway {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_service(mut self, id: &str, org_id: &str) -> Self {
		self.services.insert(id.to_string(), OrgId::new(org_id));
		self
	}

	pub fn with_engagement(mut self, id: &str, org_id: &str) -> Self {
		self.engagements.insert(id.to_string(), OrgId::new(org_id));
		self
	}

	pub fn with_contact(mut self, id: &str, org_id: &str) -> Self {
		self.contacts.insert(id.to_string(), OrgId::new(org_id));
		self
	}

	pub fn with_tag(mut self, id: &str, org_id: &str) -> Self {
		self.tags.insert(id.to_string(), OrgId::new(org_id));
		self
	}

	pub fn with_service_answer(mut self, id: &str, service_id: &str) -> Self {
		self
			.service_answers
			.insert(id.to_string(), ServiceId::new(service_id));
		self
	}

	pub fn with_user(mut self, id: &str, roles: &[(&str, RoleType)]) -> Self {
		let roles = roles
			.iter()
			.map(|(org_id, role_type)| Role::new(*org_id, *role_type))
			.collect();
		self.users.insert(id.to_string(), roles);
		self
	}

	/// Every lookup fails with [`GatewayError::Unavailable`].
	pub fn unavailable(mut self) -> Self {
		self.mode = Mode::Unavailable;
		self
	}

	/// Every lookup hangs until dropped.
	pub fn stalled(mut self) -> Self {
		self.mode = Mode::Stalled;
		self
	}

	pub fn lookups(&self, collection: Collection) -> usize {
		self
			.lookups
			.lock()
			.unwrap()
			.get(&collection)
			.copied()
			.unwrap_or(0)
	}

	pub fn total_lookups(&self) -> usize {
		self.lookups.lock().unwrap().values().sum()
	}

	async fn enter(&self, collection: Collection) -> Result<(), GatewayError> {
		*self.lookups.lock().unwrap().entry(collection).or_default() += 1;
		match self.mode {
			Mode::Normal => Ok(()),
			Mode::Unavailable => Err(GatewayError::Unavailable("fixture offline".to_string())),
			Mode::Stalled => futures::future::pending().await,
		}
	}

	fn owned<I: Clone>(map: &HashMap<String, OrgId>, id: &I, key: &str) -> Option<OwnedRecord<I>> {
		map.get(key).map(|org_id| OwnedRecord {
			id: id.clone(),
			org_id: org_id.clone(),
		})
	}
}

#[async_trait]
impl CollectionGateway for InMemoryGateway {
	async fn get_service(&self, id: &ServiceId) -> Result<Option<OwnedRecord<ServiceId>>, GatewayError> {
		self.enter(Collection::Services).await?;
		Ok(Self::owned(&self.services, id, id.as_str()))
	}

	async fn get_engagement(
		&self,
		id: &EngagementId,
	) -> Result<Option<OwnedRecord<EngagementId>>, GatewayError> {
		self.enter(Collection::Engagements).await?;
		Ok(Self::owned(&self.engagements, id, id.as_str()))
	}

	async fn get_contact(&self, id: &ContactId) -> Result<Option<OwnedRecord<ContactId>>, GatewayError> {
		self.enter(Collection::Contacts).await?;
		Ok(Self::owned(&self.contacts, id, id.as_str()))
	}

	async fn get_tag(&self, id: &TagId) -> Result<Option<OwnedRecord<TagId>>, GatewayError> {
		self.enter(Collection::Tags).await?;
		Ok(Self::owned(&self.tags, id, id.as_str()))
	}

	async fn get_service_answer(
		&self,
		id: &ServiceAnswerId,
	) -> Result<Option<ServiceAnswerRecord>, GatewayError> {
		self.enter(Collection::ServiceAnswers).await?;
		Ok(self
			.service_answers
			.get(id.as_str())
			.map(|service_id| ServiceAnswerRecord {
				id: id.clone(),
				service_id: service_id.clone(),
			}))
	}

	async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, GatewayError> {
		self.enter(Collection::Users).await?;
		Ok(self.users.get(id.as_str()).map(|roles| UserRecord {
			id: id.clone(),
			roles: roles.clone(),
		}))
	}
}

/// Identity loader over a fixed token table.
#[derive(Debug, Default)]
pub struct StaticIdentityLoader {
	identities: HashMap<String, Identity>,
	calls: Arc<AtomicUsize>,
	mode: Mode,
}

impl StaticIdentityLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_token(mut self, token: &str, identity: Identity) -> Self {
		self.identities.insert(token.to_string(), identity);
		self
	}

	pub fn failing(mut self) -> Self {
		self.mode = Mode::Unavailable;
		self
	}

	pub fn stalled(mut self) -> Self {
		self.mode = Mode::Stalled;
		self
	}

	/// Shared counter of `load_identity` calls.
	pub fn calls(&self) -> Arc<AtomicUsize> {
		self.calls.clone()
	}
}

#[async_trait]
impl IdentityLoader for StaticIdentityLoader {
	async fn load_identity(&self, token: &BearerToken) -> Result<Option<Identity>, GatewayError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		match self.mode {
			Mode::Normal => Ok(self.identities.get(token.expose()).cloned()),
			Mode::Unavailable => Err(GatewayError::Unavailable("identity store offline".to_string())),
			Mode::Stalled => futures::future::pending().await,
		}
	}
}
