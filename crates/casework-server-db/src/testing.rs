// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::schema::ensure_schema;

/// Single-connection in-memory pool so every query sees the same database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	ensure_schema(&pool).await.unwrap();
	pool
}

pub async fn insert_owned(pool: &SqlitePool, table: &str, id: &str, org_id: &str) {
	sqlx::query(&format!("INSERT INTO {table} (id, org_id) VALUES (?, ?)"))
		.bind(id)
		.bind(org_id)
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_service_answer(pool: &SqlitePool, id: &str, service_id: &str) {
	sqlx::query("INSERT INTO service_answers (id, service_id) VALUES (?, ?)")
		.bind(id)
		.bind(service_id)
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_user(pool: &SqlitePool, id: &str, roles: &[(&str, &str)]) {
	sqlx::query("INSERT INTO users (id) VALUES (?)")
		.bind(id)
		.execute(pool)
		.await
		.unwrap();

	for (org_id, role_type) in roles {
		sqlx::query("INSERT INTO user_roles (user_id, org_id, role_type) VALUES (?, ?, ?)")
			.bind(id)
			.bind(org_id)
			.bind(role_type)
			.execute(pool)
			.await
			.unwrap();
	}
}

pub async fn insert_access_token(
	pool: &SqlitePool,
	token_hash: &str,
	user_id: &str,
	expires_at: Option<&str>,
	revoked_at: Option<&str>,
) {
	sqlx::query(
		"INSERT INTO access_tokens (token_hash, user_id, expires_at, revoked_at) VALUES (?, ?, ?, ?)",
	)
	.bind(token_hash)
	.bind(user_id)
	.bind(expires_at)
	.bind(revoked_at)
	.execute(pool)
	.await
	.unwrap();
}
