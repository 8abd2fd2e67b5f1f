// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role hierarchy checks.
//!
//! Pure functions over [`RoleType`] ranks and an [`Identity`]'s role list. No
//! lookups happen here; the caller has already resolved which organization(s)
//! own the resource.

use crate::identity::Identity;
use crate::types::{OrgId, RoleType};

/// Returns true iff `actual` ranks at or above `required`.
pub fn meets_or_exceeds(actual: RoleType, required: RoleType) -> bool {
	actual.rank() >= required.rank()
}

/// Returns true iff `identity` holds a role in `org_id` that meets `required`.
///
/// No role in the organization means no access.
pub fn is_sufficient(identity: &Identity, org_id: &OrgId, required: RoleType) -> bool {
	identity
		.role_in(org_id)
		.map(|actual| meets_or_exceeds(actual, required))
		.unwrap_or(false)
}

/// Returns true iff [`is_sufficient`] holds for at least one of `org_ids`.
///
/// Used only for user-targeted operations, where the target belongs to a set of
/// organizations. An empty set never grants access.
pub fn is_sufficient_in_any<'a, I>(identity: &Identity, org_ids: I, required: RoleType) -> bool
where
	I: IntoIterator<Item = &'a OrgId>,
{
	org_ids
		.into_iter()
		.any(|org_id| is_sufficient(identity, org_id, required))
}
