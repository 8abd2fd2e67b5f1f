// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Composition root for the Casework policy engine.
//!
//! Wires the SQLite gateway and identity repository from
//! `casework-server-db` into a [`PolicyEngine`] configured from
//! `casework-server-config`, and evaluates single decisions for the
//! operator CLI.

pub mod version;

use std::sync::Arc;

use casework_server_auth::{
	Decision, ErrorBody, Grant, Operation, ParentRef, PolicyEngine, PolicySettings, RoleType,
	StrategyRegistry,
};
use casework_server_config::{PolicyConfig, ServerConfig};
use casework_server_db::{IdentityRepository, SqliteCollectionGateway};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

pub fn policy_settings(config: &PolicyConfig) -> PolicySettings {
	PolicySettings {
		lookup_timeout: config.lookup_timeout(),
		reveal_missing_entities: config.reveal_missing_entities,
	}
}

/// Build the engine over one pool shared by the gateway and the identity loader.
pub fn build_policy_engine(config: &ServerConfig, pool: SqlitePool) -> PolicyEngine {
	PolicyEngine::new(
		StrategyRegistry::standard(),
		Arc::new(SqliteCollectionGateway::new(pool.clone())),
		Arc::new(IdentityRepository::new(pool)),
		policy_settings(&config.policy),
	)
}

/// Parse `Typename:id`, e.g. `Organization:org1` or `Engagement:e1`.
pub fn parse_parent(value: &str) -> Result<ParentRef, String> {
	let (typename, id) = value
		.split_once(':')
		.ok_or_else(|| format!("expected Typename:id, got '{value}'"))?;
	if typename.is_empty() || id.is_empty() {
		return Err(format!("expected Typename:id, got '{value}'"));
	}
	if typename == "Organization" {
		Ok(ParentRef::organization(id))
	} else {
		Ok(ParentRef::entity(typename, id))
	}
}

/// Outcome of one evaluation as printed by `casework-server authorize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionReport {
	pub operation: String,
	pub allowed: bool,
	/// HTTP status a server would answer with.
	pub status: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub grant: Option<Grant>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorBody>,
}

/// Evaluate `operation` against `required` and report the caller-facing result.
pub async fn evaluate(
	engine: &PolicyEngine,
	operation: &Operation,
	required: RoleType,
) -> DecisionReport {
	match engine.authorize_operation(operation, required).await {
		Decision::Allow(grant) => DecisionReport {
			operation: operation.name.clone(),
			allowed: true,
			status: 200,
			grant: Some(grant),
			error: None,
		},
		Decision::Deny(reason) => {
			let err = engine.deny_error(reason);
			DecisionReport {
				operation: operation.name.clone(),
				allowed: false,
				status: err.status_code(),
				grant: None,
				error: Some(err.to_body()),
			}
		}
	}
}
