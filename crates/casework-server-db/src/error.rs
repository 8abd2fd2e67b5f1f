// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use casework_server_auth::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Any storage failure leaves the engine unable to decide, which it treats as
/// a denial.
impl From<DbError> for GatewayError {
	fn from(err: DbError) -> Self {
		GatewayError::Unavailable(err.to_string())
	}
}
