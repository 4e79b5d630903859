//! Player and slot descriptors.

use serde::{Deserialize, Serialize};

/// A player as listed in `Connected` and `RoomUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPlayer {
	pub team: i64,
	pub slot: i64,
	#[serde(default)]
	pub alias: String,
	pub name: String,
}

/// Static slot information from `Connected.slot_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSlot {
	pub name: String,
	pub game: String,
	/// 0 = spectator, 1 = player, 2 = group.
	#[serde(default, rename = "type")]
	pub kind: u8,
	#[serde(default)]
	pub group_members: Vec<i64>,
}
