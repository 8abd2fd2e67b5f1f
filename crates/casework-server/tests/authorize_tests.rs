// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end decisions against a SQLite database.
//!
//! Tests cover:
//! - Direct org arguments and one-hop record lookups
//! - Two-hop service answer ownership
//! - Any-match over a referenced user's organizations
//! - Dangling references, hidden or revealed per configuration
//! - Missing, malformed and revoked credentials

use casework_server::{build_policy_engine, evaluate, DecisionReport};
use casework_server_auth::{hash_token, Operation, OperationArgs, ParentRef, RoleType};
use casework_server_config::ServerConfig;
use http::HeaderValue;
use sqlx::sqlite::SqlitePool;
use tempfile::tempdir;

async fn setup_pool() -> (SqlitePool, tempfile::TempDir) {
	let dir = tempdir().unwrap();
	let db_path = dir.path().join("casework.db");
	let db_url = format!("sqlite:{}", db_path.display());
	let pool = casework_server_db::create_pool(&db_url).await.unwrap();
	casework_server_db::ensure_schema(&pool).await.unwrap();

	for sql in [
		"INSERT INTO users (id) VALUES ('alice'), ('bob'), ('u9')",
		"INSERT INTO user_roles (user_id, org_id, role_type) VALUES \
		 ('alice', 'org1', 'admin'), ('alice', 'org2', 'viewer'), \
		 ('bob', 'org3', 'admin'), \
		 ('u9', 'org1', 'user'), ('u9', 'org3', 'user')",
		"INSERT INTO services (id, org_id) VALUES ('s1', 'org1')",
		"INSERT INTO engagements (id, org_id) VALUES ('e1', 'org2')",
		"INSERT INTO service_answers (id, service_id) VALUES ('a1', 's1')",
	] {
		sqlx::query(sql).execute(&pool).await.unwrap();
	}

	for (token, user) in [("tok-alice", "alice"), ("tok-bob", "bob")] {
		sqlx::query("INSERT INTO access_tokens (token_hash, user_id) VALUES (?, ?)")
			.bind(hash_token(token))
			.bind(user)
			.execute(&pool)
			.await
			.unwrap();
	}

	(pool, dir)
}

fn op(token: &str, args: OperationArgs) -> Operation {
	Operation::new("test")
		.with_authorization(HeaderValue::from_str(&format!("Bearer {token}")).unwrap())
		.with_args(args)
}

async fn run(config: &ServerConfig, operation: Operation, required: RoleType) -> DecisionReport {
	let (pool, _dir) = setup_pool().await;
	let engine = build_policy_engine(config, pool);
	evaluate(&engine, &operation, required).await
}

#[tokio::test]
async fn admin_passes_org_argument() {
	let report = run(
		&ServerConfig::default(),
		op("tok-alice", OperationArgs::new().with("orgId", "org1")),
		RoleType::Admin,
	)
	.await;
	assert!(report.allowed);
	assert_eq!(report.status, 200);
	assert!(report.error.is_none());
}

#[tokio::test]
async fn viewer_cannot_write_engagement() {
	let report = run(
		&ServerConfig::default(),
		op("tok-alice", OperationArgs::new().with("engagementId", "e1")),
		RoleType::User,
	)
	.await;
	assert!(!report.allowed);
	assert_eq!(report.status, 403);
	assert_eq!(report.error.unwrap().code, "forbidden");
}

#[tokio::test]
async fn service_answer_resolves_through_service() {
	let report = run(
		&ServerConfig::default(),
		op("tok-alice", OperationArgs::new().with("answerId", "a1")),
		RoleType::Admin,
	)
	.await;
	assert!(report.allowed);
}

#[tokio::test]
async fn user_reference_allows_any_shared_org() {
	let report = run(
		&ServerConfig::default(),
		op("tok-bob", OperationArgs::new().with("userId", "u9")),
		RoleType::Admin,
	)
	.await;
	assert!(report.allowed);
}

#[tokio::test]
async fn parent_organization_wins_over_arguments() {
	let operation = op("tok-alice", OperationArgs::new().with("orgId", "org2"))
		.with_parent(ParentRef::organization("org1"));
	let report = run(&ServerConfig::default(), operation, RoleType::Admin).await;
	assert!(report.allowed);
}

#[tokio::test]
async fn missing_answer_is_hidden_by_default() {
	let report = run(
		&ServerConfig::default(),
		op("tok-alice", OperationArgs::new().with("answerId", "nope")),
		RoleType::Viewer,
	)
	.await;
	assert!(!report.allowed);
	assert_eq!(report.status, 403);
	assert_eq!(report.error.unwrap().code, "forbidden");
}

#[tokio::test]
async fn missing_answer_is_revealed_when_configured() {
	let mut config = ServerConfig::default();
	config.policy.reveal_missing_entities = true;
	let report = run(
		&config,
		op("tok-alice", OperationArgs::new().with("answerId", "nope")),
		RoleType::Viewer,
	)
	.await;
	assert_eq!(report.status, 404);
	assert_eq!(report.error.unwrap().code, "not_found");
}

#[tokio::test]
async fn missing_credential_is_unauthenticated() {
	let operation = Operation::new("test").with_args(OperationArgs::new().with("orgId", "org1"));
	let report = run(&ServerConfig::default(), operation, RoleType::Viewer).await;
	assert_eq!(report.status, 401);
	assert_eq!(report.error.unwrap().code, "unauthenticated");
}

#[tokio::test]
async fn unknown_token_is_unauthenticated() {
	let report = run(
		&ServerConfig::default(),
		op("tok-mallory", OperationArgs::new().with("orgId", "org1")),
		RoleType::Viewer,
	)
	.await;
	assert_eq!(report.status, 401);
}

#[tokio::test]
async fn unmatched_arguments_are_an_internal_failure() {
	let report = run(
		&ServerConfig::default(),
		op("tok-alice", OperationArgs::new().with("widgetId", "w1")),
		RoleType::Viewer,
	)
	.await;
	assert_eq!(report.status, 500);
	let error = report.error.unwrap();
	assert_eq!(error.code, "policy_resolution_failure");
	assert_eq!(error.message, "internal authorization error");
}

#[tokio::test]
async fn report_serializes_grant_on_allow() {
	let report = run(
		&ServerConfig::default(),
		op("tok-alice", OperationArgs::new().with("serviceId", "s1")),
		RoleType::User,
	)
	.await;
	let json = serde_json::to_value(&report).unwrap();
	assert_eq!(json["allowed"], true);
	assert_eq!(json["grant"]["user_id"], "alice");
	assert!(json.get("error").is_none());
}
