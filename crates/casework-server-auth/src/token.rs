// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token wrapper.
//!
//! The raw token is zeroized on drop and never printed; `Debug` and `Display`
//! both render `[REDACTED]`. Storage lookups use [`BearerToken::hash`].

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Placeholder printed in place of token material.
pub const REDACTED: &str = "[REDACTED]";

/// A bearer token taken from an `Authorization` header.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BearerToken(String);

impl BearerToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	/// Explicitly access the raw token.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// SHA-256 of the token, hex encoded. Safe to log and store.
	pub fn hash(&self) -> String {
		hash_token(&self.0)
	}
}

impl fmt::Debug for BearerToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("BearerToken").field(&REDACTED).finish()
	}
}

impl fmt::Display for BearerToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

/// Hash a raw token with SHA-256 and return the hex digest.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}
