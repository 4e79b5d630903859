//! Hint records and the scouting hint policy.

use serde::{Deserialize, Serialize};

use crate::items::ItemFlags;

/// Player-assigned status of a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum HintStatus {
	#[default]
	Unspecified,
	NoPriority,
	Avoid,
	Priority,
	Found,
}

impl From<HintStatus> for u8 {
	fn from(status: HintStatus) -> u8 {
		match status {
			HintStatus::Unspecified => 0,
			HintStatus::NoPriority => 10,
			HintStatus::Avoid => 20,
			HintStatus::Priority => 30,
			HintStatus::Found => 40,
		}
	}
}

impl From<u8> for HintStatus {
	fn from(value: u8) -> Self {
		match value {
			10 => HintStatus::NoPriority,
			20 => HintStatus::Avoid,
			30 => HintStatus::Priority,
			40 => HintStatus::Found,
			_ => HintStatus::Unspecified,
		}
	}
}

/// A hint as stored by the server under `_read_hints_{team}_{slot}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
	pub receiving_player: i64,
	pub finding_player: i64,
	pub location: i64,
	pub item: i64,
	pub found: bool,
	#[serde(default)]
	pub entrance: String,
	#[serde(default)]
	pub item_flags: ItemFlags,
	#[serde(default)]
	pub status: HintStatus,
}

/// Whether a `LocationScouts` request also creates hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum HintCreationPolicy {
	/// Plain scout, no side effects on the server.
	#[default]
	None,
	/// Create hints and announce every one of them.
	CreateAndAnnounce,
	/// Create hints, announcing only those that did not exist yet.
	CreateAndAnnounceOnce,
}

impl HintCreationPolicy {
	pub fn for_hint(as_hint: bool) -> Self {
		if as_hint {
			HintCreationPolicy::CreateAndAnnounceOnce
		} else {
			HintCreationPolicy::None
		}
	}
}

impl From<HintCreationPolicy> for u8 {
	fn from(policy: HintCreationPolicy) -> u8 {
		match policy {
			HintCreationPolicy::None => 0,
			HintCreationPolicy::CreateAndAnnounce => 1,
			HintCreationPolicy::CreateAndAnnounceOnce => 2,
		}
	}
}

impl From<u8> for HintCreationPolicy {
	fn from(value: u8) -> Self {
		match value {
			1 => HintCreationPolicy::CreateAndAnnounce,
			2 => HintCreationPolicy::CreateAndAnnounceOnce,
			_ => HintCreationPolicy::None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hint_parses_server_record() {
		let json = r#"{
			"receiving_player": 1,
			"finding_player": 2,
			"location": 1000,
			"item": 77,
			"found": false,
			"entrance": "",
			"item_flags": 1,
			"status": 30,
			"class": "Hint"
		}"#;
		let hint: Hint = serde_json::from_str(json).unwrap();
		assert_eq!(hint.finding_player, 2);
		assert_eq!(hint.status, HintStatus::Priority);
		assert!(hint.item_flags.contains(ItemFlags::ADVANCEMENT));
	}

	#[test]
	fn hint_without_status_is_unspecified() {
		let json = r#"{"receiving_player": 1, "finding_player": 1, "location": 5, "item": 6, "found": true}"#;
		let hint: Hint = serde_json::from_str(json).unwrap();
		assert_eq!(hint.status, HintStatus::Unspecified);
	}

	#[test]
	fn policy_for_hint_announces_once() {
		assert_eq!(HintCreationPolicy::for_hint(true), HintCreationPolicy::CreateAndAnnounceOnce);
		assert_eq!(HintCreationPolicy::for_hint(false), HintCreationPolicy::None);
		assert_eq!(u8::from(HintCreationPolicy::CreateAndAnnounceOnce), 2);
	}
}
