//! Scouted location records.

use std::fmt;

use ap_protocol::ItemFlags;
use serde::{Deserialize, Serialize};

const GENERIC_ITEM_NAME: &str = "Item for another world in this Archipelago";

/// Coarse item class, derived from [`ItemFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemClassification {
	Progression,
	Useful,
	Trap,
	Filler,
}

impl ItemClassification {
	/// Advancement wins over never-exclude, which wins over trap.
	pub fn from_flags(flags: ItemFlags) -> Self {
		if flags.contains(ItemFlags::ADVANCEMENT) {
			ItemClassification::Progression
		} else if flags.contains(ItemFlags::NEVER_EXCLUDE) {
			ItemClassification::Useful
		} else if flags.contains(ItemFlags::TRAP) {
			ItemClassification::Trap
		} else {
			ItemClassification::Filler
		}
	}

	/// Flags for a classification name. Unknown names map to no flags.
	pub fn flags_from_text(text: &str) -> ItemFlags {
		match text {
			"Progression" => ItemFlags::ADVANCEMENT,
			"Useful" => ItemFlags::NEVER_EXCLUDE,
			"Trap" => ItemFlags::TRAP,
			_ => ItemFlags::NONE,
		}
	}

	pub fn flags(self) -> ItemFlags {
		match self {
			ItemClassification::Progression => ItemFlags::ADVANCEMENT,
			ItemClassification::Useful => ItemFlags::NEVER_EXCLUDE,
			ItemClassification::Trap => ItemFlags::TRAP,
			ItemClassification::Filler => ItemFlags::NONE,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			ItemClassification::Progression => "Progression",
			ItemClassification::Useful => "Useful",
			ItemClassification::Trap => "Trap",
			ItemClassification::Filler => "Filler",
		}
	}
}

impl fmt::Display for ItemClassification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What sits at a location, as answered by the server.
///
/// The classification is serialized for readers but always recomputed from
/// `flags` when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScoutedRecord")]
pub struct ScoutedLocation {
	pub location_name: String,
	pub item_name: String,
	/// Player the item belongs to.
	pub player_name: String,
	/// Game of the player the item belongs to.
	pub game_name: String,
	pub location_id: i64,
	pub item_id: i64,
	pub player_id: i64,
	pub flags: ItemFlags,
	classification: ItemClassification,
}

#[derive(Deserialize)]
struct ScoutedRecord {
	location_name: String,
	item_name: String,
	player_name: String,
	game_name: String,
	location_id: i64,
	item_id: i64,
	player_id: i64,
	flags: ItemFlags,
}

impl From<ScoutedRecord> for ScoutedLocation {
	fn from(record: ScoutedRecord) -> Self {
		Self::new(
			record.location_name,
			record.item_name,
			record.player_name,
			record.game_name,
			record.location_id,
			record.item_id,
			record.player_id,
			record.flags,
		)
	}
}

impl ScoutedLocation {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		location_name: impl Into<String>,
		item_name: impl Into<String>,
		player_name: impl Into<String>,
		game_name: impl Into<String>,
		location_id: i64,
		item_id: i64,
		player_id: i64,
		flags: ItemFlags,
	) -> Self {
		Self {
			location_name: location_name.into(),
			item_name: item_name.into(),
			player_name: player_name.into(),
			game_name: game_name.into(),
			location_id,
			item_id,
			player_id,
			flags,
			classification: ItemClassification::from_flags(flags),
		}
	}

	pub fn classification(&self) -> ItemClassification {
		self.classification
	}

	/// Item name passed through `transform`, or the numeric id when the name is blank.
	pub fn item_name_with(&self, transform: impl FnOnce(&str) -> String) -> String {
		if self.item_name.trim().is_empty() {
			return self.item_id.to_string();
		}
		transform(&self.item_name)
	}

	/// Placeholder name for an item of another world.
	pub fn generic_item_name() -> &'static str {
		GENERIC_ITEM_NAME
	}

	/// Stable 32-bit seed for pseudo-random choices tied to this placement.
	pub fn seed(&self) -> i32 {
		let mut seed: i64 = 7;
		seed = seed.wrapping_mul(13).wrapping_add(self.location_id);
		seed = seed.wrapping_mul(13).wrapping_add(self.item_id);
		seed = seed.wrapping_mul(13).wrapping_add(self.player_id);
		(seed % i64::from(i32::MAX)) as i32
	}
}

impl fmt::Display for ScoutedLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}'s {}", self.player_name, self.item_name_with(str::to_string))
	}
}
