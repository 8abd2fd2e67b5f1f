// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # casework-server-db
//!
//! SQLite (sqlx) implementations of the two storage seams of the policy
//! engine:
//!
//! - [`SqliteCollectionGateway`]: [`CollectionGateway`] over the org-scoped
//!   record tables
//! - [`IdentityRepository`]: [`IdentityLoader`] over `access_tokens`, `users`
//!   and `user_roles`
//!
//! Both are read-only. Lookups return `Result<Option<T>>`; absence is normal
//! and the engine turns it into a denial.
//!
//! ## Error Handling
//!
//! | Variant | When to use |
//! |---------|-------------|
//! | `Sqlx` | Let sqlx errors propagate via `?` |
//! | `Internal` | Invalid stored data (unknown role type, unparseable timestamp) |
//!
//! Every [`DbError`] reaches the engine as `GatewayError::Unavailable`.
//!
//! ## Testing
//!
//! Tests use a single-connection in-memory pool with [`schema::ensure_schema`]
//! applied; see `testing.rs`.
//!
//! [`CollectionGateway`]: casework_server_auth::CollectionGateway
//! [`IdentityLoader`]: casework_server_auth::IdentityLoader

mod error;
pub mod gateway;
pub mod identity;
pub mod pool;
pub mod schema;

#[cfg(test)]
mod testing;

pub use error::{DbError, Result};
pub use gateway::SqliteCollectionGateway;
pub use identity::IdentityRepository;
pub use pool::create_pool;
pub use schema::ensure_schema;
