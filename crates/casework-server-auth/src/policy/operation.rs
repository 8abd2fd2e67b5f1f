// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A protected operation as seen by the guard.

use http::header::{HeaderValue, AUTHORIZATION};
use http::HeaderMap;

use super::args::{OperationArgs, ParentRef};
use super::engine::Grant;

/// One query, mutation or field resolution awaiting authorization.
#[derive(Debug, Clone, Default)]
pub struct Operation {
	pub name: String,
	pub headers: HeaderMap,
	pub parent: Option<ParentRef>,
	pub args: OperationArgs,
	grant: Option<Grant>,
}

impl Operation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn with_authorization(mut self, value: HeaderValue) -> Self {
		self.headers.insert(AUTHORIZATION, value);
		self
	}

	pub fn with_parent(mut self, parent: ParentRef) -> Self {
		self.parent = Some(parent);
		self
	}

	pub fn with_args(mut self, args: OperationArgs) -> Self {
		self.args = args;
		self
	}

	/// The grant attached by the guard layer, present only once allowed.
	pub fn grant(&self) -> Option<&Grant> {
		self.grant.as_ref()
	}

	pub(crate) fn attach_grant(&mut self, grant: Grant) {
		self.grant = Some(grant);
	}
}
