// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operation arguments and the parent object a field resolves on.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::OrgId;

/// Argument keys the ownership strategies recognize.
pub mod keys {
	pub const ORG_ID: &str = "orgId";
	pub const SERVICE_ID: &str = "serviceId";
	pub const ENGAGEMENT_ID: &str = "engagementId";
	pub const CONTACT_ID: &str = "contactId";
	pub const ANSWER_ID: &str = "answerId";
	pub const USER_ID: &str = "userId";
	pub const ENGAGEMENT: &str = "engagement";
	pub const CONTACT: &str = "contact";
	pub const SERVICE: &str = "service";
	pub const SERVICE_ANSWER: &str = "serviceAnswer";
	pub const TAG: &str = "tag";
	pub const ID: &str = "id";
}

/// A reference argument that is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedArg {
	pub key: String,
}

impl MalformedArg {
	fn new(key: impl Into<String>) -> Self {
		Self { key: key.into() }
	}

	fn nested(parent: &str, key: &str) -> Self {
		Self::new(format!("{parent}.{key}"))
	}
}

/// The argument map of one operation.
///
/// A key bound to `null` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationArgs(Map<String, Value>);

impl OperationArgs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: bind `key` to `value`.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	/// Keys bound to non-null values, in map order.
	pub fn keys(&self) -> Vec<String> {
		self
			.0
			.iter()
			.filter(|(_, v)| !v.is_null())
			.map(|(k, _)| k.clone())
			.collect()
	}

	fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key).filter(|v| !v.is_null())
	}

	/// Read an id argument.
	///
	/// `None` when absent. Strings and integers are accepted; an empty string
	/// or any other JSON type is malformed.
	pub fn id_arg(&self, key: &str) -> Option<Result<String, MalformedArg>> {
		self
			.get(key)
			.map(|value| id_from_value(value).ok_or_else(|| MalformedArg::new(key)))
	}

	/// Read a nested payload object.
	pub fn payload<'a>(&'a self, key: &'a str) -> Option<Result<Payload<'a>, MalformedArg>> {
		self.get(key).map(|value| match value {
			Value::Object(fields) => Ok(Payload { key, fields }),
			_ => Err(MalformedArg::new(key)),
		})
	}

	/// Read an argument that is either a bare id or a payload carrying `id`.
	pub fn reference(&self, key: &str) -> Option<Result<String, MalformedArg>> {
		self.get(key).map(|value| match value {
			Value::Object(fields) => Payload { key, fields }.required_id(keys::ID),
			other => id_from_value(other).ok_or_else(|| MalformedArg::new(key)),
		})
	}
}

/// A nested input object, e.g. the `engagement` of a create mutation.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
	key: &'a str,
	fields: &'a Map<String, Value>,
}

impl<'a> Payload<'a> {
	/// Read a field the payload must carry. Absent, null or malformed values
	/// are all reported as `<payload>.<field>`.
	pub fn required_id(&self, field: &str) -> Result<String, MalformedArg> {
		self
			.fields
			.get(field)
			.and_then(id_from_value)
			.ok_or_else(|| MalformedArg::nested(self.key, field))
	}
}

fn id_from_value(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
		_ => None,
	}
}

/// The already-loaded object a field is resolved on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParentRef {
	Organization { id: OrgId },
	Entity { typename: String, id: String },
}

impl ParentRef {
	pub fn organization(id: impl Into<OrgId>) -> Self {
		ParentRef::Organization { id: id.into() }
	}

	pub fn entity(typename: impl Into<String>, id: impl Into<String>) -> Self {
		ParentRef::Entity {
			typename: typename.into(),
			id: id.into(),
		}
	}
}

impl fmt::Display for ParentRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParentRef::Organization { id } => write!(f, "Organization:{id}"),
			ParentRef::Entity { typename, id } => write!(f, "{typename}:{id}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn args(value: Value) -> OperationArgs {
		serde_json::from_value(value).unwrap()
	}

	mod id_arg {
		use super::*;

		#[test]
		fn reads_strings_and_integers() {
			let a = args(json!({"engagementId": "e1", "serviceId": 42}));
			assert_eq!(a.id_arg(keys::ENGAGEMENT_ID), Some(Ok("e1".to_string())));
			assert_eq!(a.id_arg(keys::SERVICE_ID), Some(Ok("42".to_string())));
		}

		#[test]
		fn null_is_absent() {
			let a = args(json!({"orgId": null}));
			assert_eq!(a.id_arg(keys::ORG_ID), None);
			assert!(a.keys().is_empty());
		}

		#[test]
		fn rejects_other_types() {
			for bad in [json!(""), json!(true), json!(1.5), json!(["e1"]), json!({"id": "e1"})] {
				let a = args(json!({ "engagementId": bad }));
				assert_eq!(
					a.id_arg(keys::ENGAGEMENT_ID),
					Some(Err(MalformedArg {
						key: "engagementId".into()
					}))
				);
			}
		}
	}

	mod payload {
		use super::*;

		#[test]
		fn reads_nested_org_id() {
			let a = args(json!({"engagement": {"orgId": "org1", "name": "Intake"}}));
			let payload = a.payload(keys::ENGAGEMENT).unwrap().unwrap();
			assert_eq!(payload.required_id(keys::ORG_ID), Ok("org1".to_string()));
		}

		#[test]
		fn missing_field_names_the_path() {
			let a = args(json!({"contact": {"name": "Ada"}}));
			let payload = a.payload(keys::CONTACT).unwrap().unwrap();
			assert_eq!(
				payload.required_id(keys::ORG_ID),
				Err(MalformedArg {
					key: "contact.orgId".into()
				})
			);
		}

		#[test]
		fn non_object_payload_is_malformed() {
			let a = args(json!({"service": "s1"}));
			assert!(matches!(a.payload(keys::SERVICE), Some(Err(_))));
		}
	}

	#[test]
	fn reference_accepts_bare_id_or_object() {
		let a = args(json!({"tag": "t1"}));
		assert_eq!(a.reference(keys::TAG), Some(Ok("t1".to_string())));
		let b = args(json!({"tag": {"id": "t2", "name": "urgent"}}));
		assert_eq!(b.reference(keys::TAG), Some(Ok("t2".to_string())));
		let c = args(json!({"tag": {"name": "urgent"}}));
		assert_eq!(
			c.reference(keys::TAG),
			Some(Err(MalformedArg {
				key: "tag.id".into()
			}))
		);
	}

	#[test]
	fn parent_display() {
		assert_eq!(ParentRef::organization("org1").to_string(), "Organization:org1");
		assert_eq!(ParentRef::entity("Engagement", "e1").to_string(), "Engagement:e1");
	}
}
