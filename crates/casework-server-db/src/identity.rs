// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access token to identity resolution.
//!
//! Tokens are stored as SHA-256 hashes, never plaintext. A token resolves only
//! while it is unrevoked and unexpired and its user still exists.

use async_trait::async_trait;
use casework_server_auth::{BearerToken, GatewayError, Identity, IdentityLoader, UserId};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::gateway::{list_roles_for_user, user_exists};

#[derive(Clone)]
pub struct IdentityRepository {
	pool: SqlitePool,
}

impl IdentityRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get the live identity for a token hash.
	///
	/// # Returns
	/// `None` if the hash is unknown, revoked, expired, or its user is gone.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_identity_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<Identity>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT user_id, expires_at, revoked_at
			FROM access_tokens
			WHERE token_hash = ?
			"#,
		)
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		let user_id = UserId::new(row.get::<String, _>("user_id"));
		let revoked_at: Option<String> = row.get("revoked_at");
		let expires_at: Option<String> = row.get("expires_at");

		if revoked_at.is_some() {
			tracing::debug!(user_id = %user_id, "access token revoked");
			return Ok(None);
		}
		if let Some(expires_at) = expires_at {
			if parse_timestamp(&expires_at)? <= Utc::now() {
				tracing::debug!(user_id = %user_id, "access token expired");
				return Ok(None);
			}
		}

		self.get_identity(&user_id).await
	}

	/// Load a user and its roles, reading both concurrently.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_identity(&self, user_id: &UserId) -> Result<Option<Identity>, DbError> {
		let (exists, roles) = tokio::try_join!(
			user_exists(&self.pool, user_id),
			list_roles_for_user(&self.pool, user_id)
		)?;

		if !exists {
			return Ok(None);
		}

		Ok(Some(Identity {
			id: user_id.clone(),
			roles,
		}))
	}
}

#[async_trait]
impl IdentityLoader for IdentityRepository {
	async fn load_identity(&self, token: &BearerToken) -> Result<Option<Identity>, GatewayError> {
		Ok(self.get_identity_by_token_hash(&token.hash()).await?)
	}
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid timestamp {value:?}: {e}")))
}
