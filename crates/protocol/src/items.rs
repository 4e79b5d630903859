//! Item placements, classification bits and client status codes.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Classification bits the server attaches to every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemFlags(u32);

impl ItemFlags {
	pub const NONE: Self = Self(0);
	/// Item may be required to reach the goal.
	pub const ADVANCEMENT: Self = Self(0b001);
	/// Item is useful and never placed on excluded locations.
	pub const NEVER_EXCLUDE: Self = Self(0b010);
	pub const TRAP: Self = Self(0b100);

	pub const fn from_bits(bits: u32) -> Self {
		Self(bits)
	}

	pub const fn bits(self) -> u32 {
		self.0
	}

	/// Returns `true` if every bit of `other` is set in `self`.
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}
}

impl BitOr for ItemFlags {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

/// Which item sources the server should send to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemsHandling(u8);

impl ItemsHandling {
	pub const NONE: Self = Self(0b000);
	/// Items found in other worlds.
	pub const REMOTE: Self = Self(0b001);
	/// Items found in this world (requires [`Self::REMOTE`]).
	pub const OWN_WORLD: Self = Self(0b011);
	/// Starting inventory (requires [`Self::REMOTE`]).
	pub const STARTING_INVENTORY: Self = Self(0b101);
	pub const ALL: Self = Self(0b111);

	pub const fn bits(self) -> u8 {
		self.0
	}
}

impl Default for ItemsHandling {
	fn default() -> Self {
		Self::ALL
	}
}

/// One item placement: which item sits at which location, for which player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
	pub item: i64,
	pub location: i64,
	/// Slot that owns the item (receiver) for `ReceivedItems`/`LocationInfo`.
	pub player: i64,
	#[serde(default)]
	pub flags: ItemFlags,
}

/// Client state reported through `StatusUpdate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ClientStatus {
	Unknown,
	Connected,
	Ready,
	Playing,
	Goal,
}

impl From<ClientStatus> for u8 {
	fn from(status: ClientStatus) -> u8 {
		match status {
			ClientStatus::Unknown => 0,
			ClientStatus::Connected => 5,
			ClientStatus::Ready => 10,
			ClientStatus::Playing => 20,
			ClientStatus::Goal => 30,
		}
	}
}

impl From<u8> for ClientStatus {
	fn from(value: u8) -> Self {
		match value {
			5 => ClientStatus::Connected,
			10 => ClientStatus::Ready,
			20 => ClientStatus::Playing,
			30 => ClientStatus::Goal,
			_ => ClientStatus::Unknown,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flags_contains_checks_every_bit() {
		let flags = ItemFlags::ADVANCEMENT | ItemFlags::TRAP;
		assert!(flags.contains(ItemFlags::ADVANCEMENT));
		assert!(flags.contains(ItemFlags::TRAP));
		assert!(!flags.contains(ItemFlags::NEVER_EXCLUDE));
		assert!(flags.contains(ItemFlags::NONE));
	}

	#[test]
	fn network_item_without_flags_defaults_to_none() {
		let item: NetworkItem =
			serde_json::from_str(r#"{"item": 7, "location": 12, "player": 2, "class": "NetworkItem"}"#)
				.unwrap();
		assert_eq!(item.flags, ItemFlags::NONE);
		assert_eq!(item.player, 2);
	}

	#[test]
	fn client_status_goal_is_thirty_on_the_wire() {
		let json = serde_json::to_value(ClientStatus::Goal).unwrap();
		assert_eq!(json, serde_json::json!(30));
	}
}
