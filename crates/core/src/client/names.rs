//! Id and name lookups.
//!
//! These never reconnect: the live room is consulted only while connected,
//! the bundled data package otherwise.

use super::Client;
use crate::names::NameResolver;

impl Client {
	/// Name of location `id` in `game`.
	pub fn location_name(&self, id: i64, game: &str) -> String {
		match self.live_room() {
			Some(room) => self.names().location_name(Some(&room.read()), id, game),
			None => self.names().location_name(None, id, game),
		}
	}

	/// Name of location `id` in this client's game.
	pub fn my_location_name(&self, id: i64) -> String {
		self.location_name(id, self.game_name())
	}

	/// Name of item `id` in this client's game.
	pub fn item_name(&self, id: i64) -> String {
		self.item_name_in(id, self.game_name())
	}

	pub fn item_name_in(&self, id: i64, game: &str) -> String {
		match self.live_room() {
			Some(room) => self.names().item_name(Some(&room.read()), id, game),
			None => self.names().item_name(None, id, game),
		}
	}

	/// Id of location `name` in this client's game.
	pub fn location_id(&self, name: &str) -> Option<i64> {
		self.location_id_in(name, self.game_name())
	}

	pub fn location_id_in(&self, name: &str, game: &str) -> Option<i64> {
		match self.live_room() {
			Some(room) => self.names().location_id(Some(&room.read()), name, game),
			None => self.names().location_id(None, name, game),
		}
	}

	/// Id of item `name` in this client's game.
	pub fn item_id(&self, name: &str) -> Option<i64> {
		let game = self.game_name();
		match self.live_room() {
			Some(room) => self.names().item_id(Some(&room.read()), name, game),
			None => self.names().item_id(None, name, game),
		}
	}

	pub(crate) fn names(&self) -> &NameResolver {
		&self.shared.names
	}
}
