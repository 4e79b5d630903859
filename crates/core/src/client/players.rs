//! Player queries.

use ap_runtime::{PlayerInfo, RoomState};

use super::Client;
use crate::scout::GENERIC_PLAYER_NAME;

impl Client {
	/// This client's team, if connected.
	pub async fn team(&self) -> Option<i64> {
		let room = self.usable_room().await?;
		let team = room.read().team();
		Some(team)
	}

	/// Name of the player at `slot`.
	pub async fn player_name(&self, slot: i64) -> String {
		let Some(room) = self.usable_room().await else {
			return GENERIC_PLAYER_NAME.to_string();
		};
		let room = room.read();
		slot_name(&room, slot)
	}

	/// Name of this client's own slot.
	pub async fn current_player_name(&self) -> String {
		if let Some(room) = self.usable_room().await {
			let room = room.read();
			return slot_name(&room, room.slot());
		}
		self.connection_info()
			.map(|info| info.slot_name)
			.unwrap_or_else(|| GENERIC_PLAYER_NAME.to_string())
	}

	pub async fn current_player(&self) -> Option<PlayerInfo> {
		let room = self.usable_room().await?;
		let room = room.read();
		room.player(room.slot()).cloned()
	}

	/// Alias of the player named `name`, if they set one.
	pub async fn player_alias(&self, name: &str) -> Option<String> {
		let room = self.usable_room().await?;
		let room = room.read();
		room.player_by_name(name)
			.map(|player| player.alias.clone())
			.filter(|alias| !alias.is_empty())
	}

	/// Returns true if a player of this team is named or aliased `name`.
	pub async fn player_exists(&self, name: &str) -> bool {
		let Some(room) = self.usable_room().await else {
			return false;
		};
		let room = room.read();
		find_player(&room, name).is_some()
	}

	/// Game of the player named or aliased `name`.
	pub async fn player_game(&self, name: &str) -> Option<String> {
		let room = self.usable_room().await?;
		let room = room.read();
		find_player(&room, name).map(|player| player.game.clone())
	}

	pub async fn player_game_by_slot(&self, slot: i64) -> Option<String> {
		let room = self.usable_room().await?;
		let room = room.read();
		room.game_of(slot).map(str::to_string)
	}

	/// Returns true if the player named `name` plays this client's game.
	pub async fn is_current_game_player(&self, name: &str) -> bool {
		self.player_game(name)
			.await
			.is_some_and(|game| game == self.game_name())
	}

	/// Players of this client's team.
	pub async fn all_players(&self) -> Vec<PlayerInfo> {
		let Some(room) = self.usable_room().await else {
			return Vec::new();
		};
		let room = room.read();
		room.players()
			.iter()
			.filter(|player| player.team == room.team())
			.cloned()
			.collect()
	}
}

fn slot_name(room: &RoomState, slot: i64) -> String {
	room.player(slot)
		.map(|player| player.name.clone())
		.unwrap_or_else(|| GENERIC_PLAYER_NAME.to_string())
}

/// Player matched by name first, alias second.
fn find_player<'a>(room: &'a RoomState, name: &str) -> Option<&'a PlayerInfo> {
	room.player_by_name(name).or_else(|| {
		room.players()
			.iter()
			.find(|player| player.team == room.team() && player.alias == name)
	})
}
