// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The ordered strategy chain.

use std::time::Duration;

use tracing::instrument;

use super::ownership::{resolve_target, Ownership, OwnershipInput, ResolutionError, Strategy, Target};
use crate::gateway::CollectionGateway;

/// Ordered list of ownership strategies. The first one whose shape is present
/// decides; later strategies are never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRegistry {
	strategies: Vec<Strategy>,
}

/// The strategy that matched and what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	pub strategy: Strategy,
	pub ownership: Ownership,
}

impl StrategyRegistry {
	pub fn new(strategies: Vec<Strategy>) -> Self {
		Self { strategies }
	}

	/// The production chain. Precedence here changes authorization outcomes for
	/// operations that carry several shapes at once, so keep it stable.
	pub fn standard() -> Self {
		Self::new(vec![
			Strategy::ParentOrganization,
			Strategy::OrgIdArgument,
			Strategy::ServiceIdArgument,
			Strategy::EngagementIdArgument,
			Strategy::ContactIdArgument,
			Strategy::AnswerIdArgument,
			Strategy::UserIdArgument,
			Strategy::EmbeddedOrgPayload,
			Strategy::ServiceAnswerPayload,
			Strategy::TagPayload,
		])
	}

	pub fn strategies(&self) -> &[Strategy] {
		&self.strategies
	}

	/// Pick the first matching strategy without performing any lookup.
	pub fn select(&self, input: &OwnershipInput<'_>) -> Result<(Strategy, Target), ResolutionError> {
		for strategy in &self.strategies {
			if let Some(matched) = strategy.matches(input) {
				return matched.map(|target| (*strategy, target));
			}
		}

		Err(ResolutionError::NoStrategy {
			arg_keys: input.args.keys(),
			parent: input.parent.map(ToString::to_string),
		})
	}

	/// Select a strategy and walk its lookup chain.
	#[instrument(skip_all, fields(strategy))]
	pub async fn resolve(
		&self,
		input: &OwnershipInput<'_>,
		gateway: &dyn CollectionGateway,
		timeout: Duration,
	) -> Result<Resolution, ResolutionError> {
		let (strategy, target) = self.select(input)?;
		tracing::Span::current().record("strategy", strategy.name());

		let ownership = resolve_target(&target, gateway, timeout).await?;
		Ok(Resolution {
			strategy,
			ownership,
		})
	}
}

impl Default for StrategyRegistry {
	fn default() -> Self {
		Self::standard()
	}
}
