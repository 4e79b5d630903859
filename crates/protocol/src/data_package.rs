//! Per-game id/name tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Id/name tables for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
	#[serde(default)]
	pub item_name_to_id: HashMap<String, i64>,
	#[serde(default)]
	pub location_name_to_id: HashMap<String, i64>,
	#[serde(default)]
	pub checksum: String,
}

/// Payload of a `DataPackage` packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPackageObject {
	#[serde(default)]
	pub games: HashMap<String, GameData>,
}
