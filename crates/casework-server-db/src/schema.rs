// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tables the policy engine reads.
//!
//! The business layer owns these tables and their write paths; this schema
//! covers only the columns authorization depends on. Statements are idempotent.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const STATEMENTS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS users (
		id TEXT PRIMARY KEY
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS user_roles (
		user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		org_id TEXT NOT NULL,
		role_type TEXT NOT NULL,
		PRIMARY KEY (user_id, org_id)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS access_tokens (
		token_hash TEXT PRIMARY KEY,
		user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		expires_at TEXT,
		revoked_at TEXT
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS services (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS engagements (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS contacts (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS tags (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS service_answers (
		id TEXT PRIMARY KEY,
		service_id TEXT NOT NULL
	)
	"#,
];

/// Create any missing tables.
#[tracing::instrument(skip(pool))]
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in STATEMENTS {
		sqlx::query(statement).execute(pool).await?;
	}
	tracing::debug!(tables = STATEMENTS.len(), "authorization schema ready");
	Ok(())
}
