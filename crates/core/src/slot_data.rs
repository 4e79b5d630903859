//! Per-slot configuration delivered at login.

use serde_json::{Map, Value};

/// Slot data key holding the dotted version the multiworld was generated for.
pub const MULTIWORLD_VERSION_KEY: &str = "multiworld_version";
/// Slot data key holding the slot's death-signal preference.
pub const DEATH_LINK_KEY: &str = "death_link";

/// Slot data as received in `Connected`.
///
/// Replaced wholesale on every successful login.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotData {
	pub slot_name: String,
	pub multiworld_version: String,
	pub death_link: bool,
	/// Every field as sent, for game-specific parsing.
	pub fields: Map<String, Value>,
}

impl SlotData {
	/// Reads the common fields. Missing fields become empty/false.
	pub fn from_fields(slot_name: &str, fields: &Map<String, Value>) -> Self {
		let multiworld_version = match fields.get(MULTIWORLD_VERSION_KEY) {
			Some(Value::String(version)) => version.clone(),
			Some(Value::Null) | None => String::new(),
			Some(other) => other.to_string(),
		};
		Self {
			slot_name: slot_name.to_string(),
			multiworld_version,
			death_link: fields.get(DEATH_LINK_KEY).is_some_and(truthy),
			fields: fields.clone(),
		}
	}

	/// Reads a game-specific field.
	pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
		self.fields
			.get(key)
			.and_then(|value| serde_json::from_value(value.clone()).ok())
	}
}

/// Slot data booleans arrive as `true`/`false` or as option numbers.
fn truthy(value: &Value) -> bool {
	match value {
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
		Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
		_ => false,
	}
}
