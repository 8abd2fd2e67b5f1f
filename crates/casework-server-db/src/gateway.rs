// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Ownership lookups for the policy engine.
//!
//! Every query is a single-row read by primary key. Absent rows are `None`;
//! the engine decides what absence means.

use async_trait::async_trait;
use casework_server_auth::{
	CollectionGateway, ContactId, EngagementId, GatewayError, OrgId, OwnedRecord, Role, RoleType,
	ServiceAnswerId, ServiceAnswerRecord, ServiceId, TagId, UserId, UserRecord,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::str::FromStr;

use crate::error::DbError;

/// Read-only repository behind [`CollectionGateway`].
#[derive(Clone)]
pub struct SqliteCollectionGateway {
	pool: SqlitePool,
}

impl SqliteCollectionGateway {
	/// Create a new gateway with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Look up the owning organization of a row in an org-scoped table.
	///
	/// `table` is always one of the fixed table names below, never caller input.
	async fn get_org_id(&self, table: &'static str, id: &str) -> Result<Option<OrgId>, DbError> {
		let row = sqlx::query(&format!("SELECT org_id FROM {table} WHERE id = ?"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some(row) => Ok(Some(OrgId::new(row.get::<String, _>("org_id")))),
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self), fields(service_id = %id))]
	pub async fn get_service(&self, id: &ServiceId) -> Result<Option<OwnedRecord<ServiceId>>, DbError> {
		let org_id = self.get_org_id("services", id.as_str()).await?;
		Ok(org_id.map(|org_id| OwnedRecord {
			id: id.clone(),
			org_id,
		}))
	}

	#[tracing::instrument(skip(self), fields(engagement_id = %id))]
	pub async fn get_engagement(
		&self,
		id: &EngagementId,
	) -> Result<Option<OwnedRecord<EngagementId>>, DbError> {
		let org_id = self.get_org_id("engagements", id.as_str()).await?;
		Ok(org_id.map(|org_id| OwnedRecord {
			id: id.clone(),
			org_id,
		}))
	}

	#[tracing::instrument(skip(self), fields(contact_id = %id))]
	pub async fn get_contact(&self, id: &ContactId) -> Result<Option<OwnedRecord<ContactId>>, DbError> {
		let org_id = self.get_org_id("contacts", id.as_str()).await?;
		Ok(org_id.map(|org_id| OwnedRecord {
			id: id.clone(),
			org_id,
		}))
	}

	#[tracing::instrument(skip(self), fields(tag_id = %id))]
	pub async fn get_tag(&self, id: &TagId) -> Result<Option<OwnedRecord<TagId>>, DbError> {
		let org_id = self.get_org_id("tags", id.as_str()).await?;
		Ok(org_id.map(|org_id| OwnedRecord {
			id: id.clone(),
			org_id,
		}))
	}

	#[tracing::instrument(skip(self), fields(answer_id = %id))]
	pub async fn get_service_answer(
		&self,
		id: &ServiceAnswerId,
	) -> Result<Option<ServiceAnswerRecord>, DbError> {
		let row = sqlx::query("SELECT service_id FROM service_answers WHERE id = ?")
			.bind(id.as_str())
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|row| ServiceAnswerRecord {
			id: id.clone(),
			service_id: ServiceId::new(row.get::<String, _>("service_id")),
		}))
	}

	/// Get a user and all of its organization roles.
	///
	/// The user row and the role rows are read concurrently.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, DbError> {
		let (exists, roles) = tokio::try_join!(
			user_exists(&self.pool, id),
			list_roles_for_user(&self.pool, id)
		)?;

		if !exists {
			return Ok(None);
		}

		Ok(Some(UserRecord {
			id: id.clone(),
			roles,
		}))
	}
}

#[async_trait]
impl CollectionGateway for SqliteCollectionGateway {
	async fn get_service(&self, id: &ServiceId) -> Result<Option<OwnedRecord<ServiceId>>, GatewayError> {
		Ok(self.get_service(id).await?)
	}

	async fn get_engagement(
		&self,
		id: &EngagementId,
	) -> Result<Option<OwnedRecord<EngagementId>>, GatewayError> {
		Ok(self.get_engagement(id).await?)
	}

	async fn get_contact(&self, id: &ContactId) -> Result<Option<OwnedRecord<ContactId>>, GatewayError> {
		Ok(self.get_contact(id).await?)
	}

	async fn get_tag(&self, id: &TagId) -> Result<Option<OwnedRecord<TagId>>, GatewayError> {
		Ok(self.get_tag(id).await?)
	}

	async fn get_service_answer(
		&self,
		id: &ServiceAnswerId,
	) -> Result<Option<ServiceAnswerRecord>, GatewayError> {
		Ok(self.get_service_answer(id).await?)
	}

	async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, GatewayError> {
		Ok(self.get_user(id).await?)
	}
}

pub(crate) async fn user_exists(pool: &SqlitePool, id: &UserId) -> Result<bool, DbError> {
	let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
		.bind(id.as_str())
		.fetch_optional(pool)
		.await?;
	Ok(row.is_some())
}

/// All roles a user holds, ordered by organization.
///
/// An unknown `role_type` is corrupt data and fails the whole read rather than
/// silently dropping the role.
pub(crate) async fn list_roles_for_user(pool: &SqlitePool, id: &UserId) -> Result<Vec<Role>, DbError> {
	let rows = sqlx::query(
		r#"
		SELECT org_id, role_type
		FROM user_roles
		WHERE user_id = ?
		ORDER BY org_id
		"#,
	)
	.bind(id.as_str())
	.fetch_all(pool)
	.await?;

	let mut roles = Vec::with_capacity(rows.len());
	for row in rows {
		let org_id: String = row.get("org_id");
		let role_type: String = row.get("role_type");
		let role_type = RoleType::from_str(&role_type)
			.map_err(|e| DbError::Internal(format!("user {id} in {org_id}: {e}")))?;
		roles.push(Role::new(org_id, role_type));
	}
	Ok(roles)
}
