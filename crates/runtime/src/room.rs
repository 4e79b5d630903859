//! Client-side view of the room a session is connected to.
//!
//! [`RoomState`] is fed every inbound packet through [`RoomState::apply`] and
//! answers the id/name, player and location questions the core asks. It is
//! shared as a [`RoomHandle`] so lookups never touch the socket.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ap_protocol::{
	Connected, GameData, JsonMessagePart, NetworkItem, NetworkPlayer, NetworkSlot, PrintJson,
	RoomUpdate, ServerPacket,
};
use parking_lot::RwLock;

/// Shared, lock-protected room state.
pub type RoomHandle = Arc<RwLock<RoomState>>;

/// A player of the room, joined with the game their slot plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
	pub team: i64,
	pub slot: i64,
	pub name: String,
	pub alias: String,
	pub game: String,
}

impl PlayerInfo {
	/// Alias when set, name otherwise.
	pub fn display_name(&self) -> &str {
		if self.alias.is_empty() { &self.name } else { &self.alias }
	}
}

/// Id/name tables of one game, indexed both ways.
#[derive(Debug, Clone, Default)]
struct GameTables {
	item_ids: HashMap<String, i64>,
	item_names: HashMap<i64, String>,
	location_ids: HashMap<String, i64>,
	location_names: HashMap<i64, String>,
}

impl GameTables {
	fn from_data(data: &GameData) -> Self {
		let mut tables = Self::default();
		for (name, id) in &data.item_name_to_id {
			tables.item_ids.insert(name.clone(), *id);
			tables.item_names.insert(*id, name.clone());
		}
		for (name, id) in &data.location_name_to_id {
			tables.location_ids.insert(name.clone(), *id);
			tables.location_names.insert(*id, name.clone());
		}
		tables
	}
}

/// Everything the client knows about its room.
#[derive(Debug, Clone, Default)]
pub struct RoomState {
	seed_name: String,
	room_tags: Vec<String>,
	games: Vec<String>,
	team: i64,
	slot: i64,
	players: Vec<PlayerInfo>,
	slot_info: HashMap<i64, NetworkSlot>,
	tables: HashMap<String, GameTables>,
	checked: BTreeSet<i64>,
	missing: BTreeSet<i64>,
	received: Vec<NetworkItem>,
	tags: Vec<String>,
	hint_points: i64,
}

impl RoomState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn into_handle(self) -> RoomHandle {
		Arc::new(RwLock::new(self))
	}

	/// Folds one inbound packet into the state.
	pub fn apply(&mut self, packet: &ServerPacket) {
		match packet {
			ServerPacket::RoomInfo(info) => {
				self.seed_name = info.seed_name.clone();
				self.room_tags = info.tags.clone();
				self.games = info.games.clone();
			}
			ServerPacket::Connected(connected) => self.apply_connected(connected),
			ServerPacket::RoomUpdate(update) => self.apply_room_update(update),
			ServerPacket::ReceivedItems { index, items } => self.apply_received(*index, items),
			ServerPacket::DataPackage { data } => {
				for (game, data) in &data.games {
					self.insert_game_data(game, data);
				}
			}
			_ => {}
		}
	}

	fn apply_connected(&mut self, connected: &Connected) {
		self.team = connected.team;
		self.slot = connected.slot;
		self.hint_points = connected.hint_points;
		self.slot_info = connected
			.slot_info
			.iter()
			.filter_map(|(key, slot)| match key.parse::<i64>() {
				Ok(id) => Some((id, slot.clone())),
				Err(_) => {
					tracing::warn!(target = "ap.room", key = %key, "Ignoring slot_info entry with non-numeric key");
					None
				}
			})
			.collect();
		self.set_players(&connected.players);
		self.checked = connected.checked_locations.iter().copied().collect();
		self.missing = connected.missing_locations.iter().copied().collect();
		self.received.clear();
	}

	fn apply_room_update(&mut self, update: &RoomUpdate) {
		if let Some(players) = &update.players {
			self.set_players(players);
		}
		if let Some(checked) = &update.checked_locations {
			for id in checked {
				self.missing.remove(id);
				self.checked.insert(*id);
			}
		}
		if let Some(missing) = &update.missing_locations {
			self.missing = missing.iter().copied().collect();
		}
		if let Some(points) = update.hint_points {
			self.hint_points = points;
		}
		if let Some(tags) = &update.tags {
			self.room_tags = tags.clone();
		}
	}

	fn apply_received(&mut self, index: u64, items: &[NetworkItem]) {
		let index = index as usize;
		if index > self.received.len() {
			tracing::warn!(
				target = "ap.room",
				index,
				known = self.received.len(),
				"Received items skip ahead of the local list"
			);
		} else {
			self.received.truncate(index);
		}
		self.received.extend_from_slice(items);
	}

	fn set_players(&mut self, players: &[NetworkPlayer]) {
		self.players = players
			.iter()
			.map(|player| PlayerInfo {
				team: player.team,
				slot: player.slot,
				name: player.name.clone(),
				alias: player.alias.clone(),
				game: self
					.slot_info
					.get(&player.slot)
					.map(|slot| slot.game.clone())
					.unwrap_or_default(),
			})
			.collect();
	}

	/// Adds or replaces the tables of one game.
	pub fn insert_game_data(&mut self, game: &str, data: &GameData) {
		self.tables.insert(game.to_string(), GameTables::from_data(data));
	}

	/// Records this client's team and slot.
	pub fn set_identity(&mut self, team: i64, slot: i64) {
		self.team = team;
		self.slot = slot;
	}

	/// Adds a player, replacing any previous entry for the same slot.
	pub fn insert_player(&mut self, team: i64, slot: i64, name: &str, game: &str) {
		self.players.retain(|p| p.slot != slot);
		self.players.push(PlayerInfo {
			team,
			slot,
			name: name.to_string(),
			alias: String::new(),
			game: game.to_string(),
		});
		self.slot_info.insert(
			slot,
			NetworkSlot {
				name: name.to_string(),
				game: game.to_string(),
				kind: 1,
				group_members: Vec::new(),
			},
		);
	}

	pub fn mark_missing(&mut self, ids: impl IntoIterator<Item = i64>) {
		for id in ids {
			self.checked.remove(&id);
			self.missing.insert(id);
		}
	}

	pub fn mark_checked(&mut self, ids: impl IntoIterator<Item = i64>) {
		for id in ids {
			self.missing.remove(&id);
			self.checked.insert(id);
		}
	}

	pub fn seed_name(&self) -> &str {
		&self.seed_name
	}

	/// Tags the server reported for the room.
	pub fn room_tags(&self) -> &[String] {
		&self.room_tags
	}

	/// Games present in the room, from `RoomInfo`.
	pub fn games(&self) -> &[String] {
		&self.games
	}

	pub fn team(&self) -> i64 {
		self.team
	}

	pub fn slot(&self) -> i64 {
		self.slot
	}

	pub fn hint_points(&self) -> i64 {
		self.hint_points
	}

	/// Tags this client is currently connected with.
	pub fn tags(&self) -> &[String] {
		&self.tags
	}

	pub fn set_tags(&mut self, tags: Vec<String>) {
		self.tags = tags;
	}

	pub fn players(&self) -> &[PlayerInfo] {
		&self.players
	}

	/// Player in this client's team at `slot`.
	pub fn player(&self, slot: i64) -> Option<&PlayerInfo> {
		self.players.iter().find(|p| p.slot == slot && p.team == self.team)
	}

	pub fn player_by_name(&self, name: &str) -> Option<&PlayerInfo> {
		self.players.iter().find(|p| p.team == self.team && p.name == name)
	}

	/// Game played by `slot`.
	pub fn game_of(&self, slot: i64) -> Option<&str> {
		self.slot_info
			.get(&slot)
			.map(|s| s.game.as_str())
			.or_else(|| self.player(slot).map(|p| p.game.as_str()))
	}

	pub fn location_name(&self, id: i64, game: &str) -> Option<&str> {
		self.tables.get(game)?.location_names.get(&id).map(String::as_str)
	}

	pub fn location_id(&self, game: &str, name: &str) -> Option<i64> {
		self.tables.get(game)?.location_ids.get(name).copied()
	}

	pub fn item_name(&self, id: i64, game: &str) -> Option<&str> {
		self.tables.get(game)?.item_names.get(&id).map(String::as_str)
	}

	pub fn item_id(&self, game: &str, name: &str) -> Option<i64> {
		self.tables.get(game)?.item_ids.get(name).copied()
	}

	pub fn is_checked(&self, location: i64) -> bool {
		self.checked.contains(&location)
	}

	pub fn is_missing(&self, location: i64) -> bool {
		self.missing.contains(&location)
	}

	/// Checked locations of this slot, ascending.
	pub fn checked_locations(&self) -> Vec<i64> {
		self.checked.iter().copied().collect()
	}

	/// Missing locations of this slot, ascending.
	pub fn missing_locations(&self) -> Vec<i64> {
		self.missing.iter().copied().collect()
	}

	/// Every location of this slot, checked or not, ascending.
	pub fn all_locations(&self) -> Vec<i64> {
		self.checked.union(&self.missing).copied().collect()
	}

	/// Items received so far, in server index order.
	pub fn received_items(&self) -> &[NetworkItem] {
		&self.received
	}

	/// Renders a `PrintJSON` message to plain text.
	///
	/// Id parts are replaced by names when the tables know them.
	pub fn render_message(&self, message: &PrintJson) -> String {
		if message.data.is_empty() {
			return message.message.clone().unwrap_or_default();
		}
		message.data.iter().map(|part| self.render_part(part)).collect()
	}

	fn render_part(&self, part: &JsonMessagePart) -> String {
		let text = part.text.as_deref().unwrap_or_default();
		let id = text.parse::<i64>().ok();
		let owner_game = part.player.and_then(|slot| self.game_of(slot));
		let resolved = match (part.kind.as_deref(), id) {
			(Some("player_id"), Some(slot)) => {
				self.player(slot).map(|p| p.display_name().to_string())
			}
			(Some("item_id"), Some(id)) => owner_game
				.and_then(|game| self.item_name(id, game))
				.map(str::to_string),
			(Some("location_id"), Some(id)) => owner_game
				.and_then(|game| self.location_name(id, game))
				.map(str::to_string),
			_ => None,
		};
		resolved.unwrap_or_else(|| text.to_string())
	}
}

#[cfg(test)]
mod tests {
	use ap_protocol::{DataPackageObject, ItemFlags};

	use super::*;

	fn hollow_knight() -> GameData {
		GameData {
			item_name_to_id: [("Mothwing Cloak".to_string(), 100)].into(),
			location_name_to_id: [("Crossroads Chest".to_string(), 2000)].into(),
			checksum: String::new(),
		}
	}

	fn connected_room() -> RoomState {
		let mut room = RoomState::new();
		let packet: ServerPacket = serde_json::from_value(serde_json::json!({
			"cmd": "Connected",
			"team": 0,
			"slot": 1,
			"players": [
				{"team": 0, "slot": 1, "alias": "", "name": "Knight"},
				{"team": 0, "slot": 2, "alias": "Mad", "name": "Madeline"}
			],
			"missing_locations": [2000, 2001],
			"checked_locations": [2002],
			"slot_info": {
				"1": {"name": "Knight", "game": "Hollow Knight", "type": 1},
				"2": {"name": "Madeline", "game": "Celeste", "type": 1}
			}
		}))
		.unwrap();
		room.apply(&packet);
		room.apply(&ServerPacket::DataPackage {
			data: DataPackageObject {
				games: [("Hollow Knight".to_string(), hollow_knight())].into(),
			},
		});
		room
	}

	#[test]
	fn connected_populates_players_and_locations() {
		let room = connected_room();
		assert_eq!(room.slot(), 1);
		assert_eq!(room.player(2).map(|p| p.game.as_str()), Some("Celeste"));
		assert_eq!(room.game_of(1), Some("Hollow Knight"));
		assert!(room.is_missing(2000));
		assert!(room.is_checked(2002));
		assert_eq!(room.all_locations(), vec![2000, 2001, 2002]);
	}

	#[test]
	fn lookups_are_scoped_by_game() {
		let room = connected_room();
		assert_eq!(room.location_name(2000, "Hollow Knight"), Some("Crossroads Chest"));
		assert_eq!(room.location_name(2000, "Celeste"), None);
		assert_eq!(room.item_id("Hollow Knight", "Mothwing Cloak"), Some(100));
	}

	#[test]
	fn room_update_moves_locations_to_checked() {
		let mut room = connected_room();
		room.apply(&ServerPacket::RoomUpdate(RoomUpdate {
			checked_locations: Some(vec![2001]),
			..RoomUpdate::default()
		}));
		assert!(room.is_checked(2001));
		assert!(!room.is_missing(2001));
	}

	#[test]
	fn received_items_reset_on_index_zero() {
		let mut room = connected_room();
		let item = |id| NetworkItem {
			item: id,
			location: 1,
			player: 2,
			flags: ItemFlags::NONE,
		};
		room.apply(&ServerPacket::ReceivedItems {
			index: 0,
			items: vec![item(1), item(2)],
		});
		room.apply(&ServerPacket::ReceivedItems {
			index: 2,
			items: vec![item(3)],
		});
		assert_eq!(room.received_items().len(), 3);

		room.apply(&ServerPacket::ReceivedItems {
			index: 0,
			items: vec![item(9)],
		});
		assert_eq!(room.received_items().len(), 1);
		assert_eq!(room.received_items()[0].item, 9);
	}

	#[test]
	fn render_message_resolves_ids() {
		let room = connected_room();
		let message = PrintJson {
			data: vec![
				JsonMessagePart {
					kind: Some("player_id".into()),
					text: Some("2".into()),
					..JsonMessagePart::default()
				},
				JsonMessagePart::text(" sent "),
				JsonMessagePart {
					kind: Some("item_id".into()),
					text: Some("100".into()),
					player: Some(1),
					..JsonMessagePart::default()
				},
				JsonMessagePart::text(" ("),
				JsonMessagePart {
					kind: Some("location_id".into()),
					text: Some("555".into()),
					player: Some(2),
					..JsonMessagePart::default()
				},
				JsonMessagePart::text(")"),
			],
			..PrintJson::default()
		};
		assert_eq!(room.render_message(&message), "Mad sent Mothwing Cloak (555)");
	}
}
