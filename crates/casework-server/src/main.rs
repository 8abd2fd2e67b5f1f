// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Casework policy engine operator CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use casework_server::{build_policy_engine, evaluate, parse_parent, version};
use casework_server_auth::{Operation, OperationArgs, ParentRef, RoleType};
use casework_server_config::LogFormat;
use clap::{Parser, Subcommand};
use http::HeaderValue;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Casework server - organization-scoped authorization.
#[derive(Parser, Debug)]
#[command(
	name = "casework-server",
	about = "Casework authorization policy engine",
	version
)]
struct Args {
	/// Config file (defaults to /etc/casework/server.toml)
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	/// Emit logs as JSON lines, overriding `logging.format`
	#[arg(long, global = true)]
	log_json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Evaluate one operation against the configured database
	Authorize {
		/// Operation name recorded in the audit trail
		#[arg(long, default_value = "cli")]
		operation: String,

		/// Raw Authorization header value, e.g. "Bearer <token>"
		#[arg(long, env = "CASEWORK_AUTHORIZATION", hide_env_values = true)]
		authorization: Option<String>,

		/// Minimum role required in the owning organization
		#[arg(long, default_value_t = RoleType::default())]
		requires: RoleType,

		/// Operation arguments as a JSON object
		#[arg(long, value_parser = parse_args, default_value = "{}")]
		args: OperationArgs,

		/// Parent object as Typename:id, e.g. Organization:org1
		#[arg(long, value_parser = parse_parent)]
		parent: Option<ParentRef>,
	},
	/// Show version and build information
	Version,
}

fn parse_args(value: &str) -> Result<OperationArgs, String> {
	serde_json::from_str(value).map_err(|e| format!("arguments must be a JSON object: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	let Command::Authorize {
		operation,
		authorization,
		requires,
		args: operation_args,
		parent,
	} = args.command
	else {
		println!("{}", version::format_version_info());
		return Ok(ExitCode::SUCCESS);
	};

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => casework_server_config::load_config_with_file(path),
		None => casework_server_config::load_config(),
	}
	.context("loading configuration")?;

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	if args.log_json || config.logging.format == LogFormat::Json {
		registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}

	tracing::info!(database = %config.database.url, "starting casework-server");

	let pool = casework_server_db::create_pool(&config.database.url)
		.await
		.context("opening database")?;
	if config.database.ensure_schema {
		casework_server_db::ensure_schema(&pool)
			.await
			.context("preparing schema")?;
	}

	let engine = build_policy_engine(&config, pool);

	let mut op = Operation::new(operation).with_args(operation_args);
	if let Some(parent) = parent {
		op = op.with_parent(parent);
	}
	if let Some(value) = authorization {
		let value = HeaderValue::from_str(&value).context("authorization is not a valid header value")?;
		op = op.with_authorization(value);
	}

	let report = evaluate(&engine, &op, requires).await;
	println!("{}", serde_json::to_string_pretty(&report)?);

	Ok(if report.allowed {
		ExitCode::SUCCESS
	} else {
		ExitCode::from(2)
	})
}
