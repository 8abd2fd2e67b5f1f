// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization-scoped authorization policy.
//!
//! - [`args`]: operation arguments and parent objects
//! - [`ownership`]: the reference shapes and their lookup chains
//! - [`registry`]: the ordered strategy chain
//! - [`engine`]: allow/deny decisions
//! - [`layer`]: tower guard for operation handlers

pub mod args;
pub mod engine;
pub mod layer;
pub mod operation;
pub mod ownership;
pub mod registry;

pub use args::{keys, MalformedArg, OperationArgs, ParentRef, Payload};
pub use engine::{Decision, DenyReason, Grant, PolicyEngine, PolicySettings, DEFAULT_LOOKUP_TIMEOUT};
pub use layer::{RequireOrgRole, RequireOrgRoleService};
pub use operation::Operation;
pub use ownership::{resolve_target, Ownership, OwnershipInput, ResolutionError, Strategy, Target};
pub use registry::{Resolution, StrategyRegistry};
