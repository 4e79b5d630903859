//! Id/name resolution with a bundled fallback table.
//!
//! Lookups go to the live room first, then to the [`LocalDataPackage`]
//! shipped with the game, then to a fixed sentinel. They never fail and never
//! touch the network: the live room is only consulted when a session is
//! already up.

use std::collections::HashMap;

use ap_protocol::GameData;
use ap_runtime::RoomState;
use tracing::{debug, error};

/// Name returned for a location no table knows.
pub const MISSING_LOCATION_NAME: &str = "Thin Air";
/// Name returned for an item no table knows.
pub const MISSING_ITEM_NAME: &str = "Error Item";

/// Id/name tables of the local game, bundled with the mod.
#[derive(Debug, Clone, Default)]
pub struct LocalDataPackage {
	item_names: HashMap<i64, String>,
	item_ids: HashMap<String, i64>,
	location_names: HashMap<i64, String>,
	location_ids: HashMap<String, i64>,
}

impl LocalDataPackage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_game_data(data: &GameData) -> Self {
		let mut package = Self::new();
		for (name, id) in &data.item_name_to_id {
			package.insert_item(*id, name);
		}
		for (name, id) in &data.location_name_to_id {
			package.insert_location(*id, name);
		}
		package
	}

	/// Parses a data package in the server's per-game format:
	/// `{"item_name_to_id": {...}, "location_name_to_id": {...}}`.
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		let data: GameData = serde_json::from_str(json)?;
		Ok(Self::from_game_data(&data))
	}

	pub fn with_item(mut self, id: i64, name: impl Into<String>) -> Self {
		self.insert_item(id, &name.into());
		self
	}

	pub fn with_location(mut self, id: i64, name: impl Into<String>) -> Self {
		self.insert_location(id, &name.into());
		self
	}

	fn insert_item(&mut self, id: i64, name: &str) {
		self.item_names.insert(id, name.to_string());
		self.item_ids.insert(name.to_string(), id);
	}

	fn insert_location(&mut self, id: i64, name: &str) {
		self.location_names.insert(id, name.to_string());
		self.location_ids.insert(name.to_string(), id);
	}

	pub fn item_name(&self, id: i64) -> Option<&str> {
		self.item_names.get(&id).map(String::as_str)
	}

	pub fn item_id(&self, name: &str) -> Option<i64> {
		self.item_ids.get(name).copied()
	}

	pub fn location_name(&self, id: i64) -> Option<&str> {
		self.location_names.get(&id).map(String::as_str)
	}

	pub fn location_id(&self, name: &str) -> Option<i64> {
		self.location_ids.get(name).copied()
	}
}

/// Resolves ids and names through the live room and the local package.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
	local: LocalDataPackage,
}

impl NameResolver {
	pub fn new(local: LocalDataPackage) -> Self {
		Self { local }
	}

	pub fn local(&self) -> &LocalDataPackage {
		&self.local
	}

	/// Name of location `id` in `game`, or [`MISSING_LOCATION_NAME`].
	pub fn location_name(&self, room: Option<&RoomState>, id: i64, game: &str) -> String {
		if let Some(room) = room {
			match room.location_name(id, game).filter(|name| !name.trim().is_empty()) {
				Some(name) => return name.to_string(),
				None => error!(
					target = "ap.names",
					location = id,
					%game,
					"Location missing from the server data package, which is probably corrupted"
				),
			}
		}

		match self.local.location_name(id) {
			Some(name) => name.to_string(),
			None => {
				debug!(target = "ap.names", location = id, %game, "Unknown location");
				MISSING_LOCATION_NAME.to_string()
			}
		}
	}

	/// Name of item `id` in `game`, or [`MISSING_ITEM_NAME`].
	pub fn item_name(&self, room: Option<&RoomState>, id: i64, game: &str) -> String {
		if let Some(room) = room {
			match room.item_name(id, game).filter(|name| !name.trim().is_empty()) {
				Some(name) => return name.to_string(),
				None => error!(
					target = "ap.names",
					item = id,
					%game,
					"Item missing from the server data package, which is probably corrupted"
				),
			}
		}

		match self.local.item_name(id) {
			Some(name) => name.to_string(),
			None => {
				debug!(target = "ap.names", item = id, %game, "Unknown item");
				MISSING_ITEM_NAME.to_string()
			}
		}
	}

	/// Id of location `name` in `game`, if any table knows it.
	pub fn location_id(&self, room: Option<&RoomState>, name: &str, game: &str) -> Option<i64> {
		room.and_then(|room| room.location_id(game, name))
			.filter(|id| *id > 0)
			.or_else(|| self.local.location_id(name))
	}

	/// Id of item `name` in `game`, if any table knows it.
	pub fn item_id(&self, room: Option<&RoomState>, name: &str, game: &str) -> Option<i64> {
		room.and_then(|room| room.item_id(game, name))
			.filter(|id| *id > 0)
			.or_else(|| self.local.item_id(name))
	}
}
