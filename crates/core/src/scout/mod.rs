//! Scout result cache.
//!
//! Scouting asks the server what sits at a location. Answers never change for
//! a seed, so they are kept for the lifetime of the client. A location scouted
//! silently can still be scouted again as a hint, which makes the server
//! announce it; after that no further request is made for it.
//!
//! The cache splits a request into cached answers and locations that need a
//! round-trip, and commits the server's answer back.

mod location;

use std::collections::{HashMap, HashSet};

use ap_protocol::NetworkItem;
use ap_runtime::RoomState;
use tracing::debug;

pub use location::{ItemClassification, ScoutedLocation};

use crate::names::NameResolver;

/// Shown for the owner of an item whose slot is unknown.
pub const GENERIC_PLAYER_NAME: &str = "Archipelago Player";
/// Game reported for items whose owner is unknown.
pub const GENERIC_GAME_NAME: &str = "Archipelago";

/// Location names that still need a server round-trip, with their ids.
pub type PendingScouts = Vec<(String, i64)>;

#[derive(Debug, Default)]
pub struct ScoutCache {
	entries: HashMap<String, ScoutedLocation>,
	hinted: HashSet<String>,
}

impl ScoutCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true unless `name` is cached and, for hint requests, already hinted.
	pub fn needs_scout(&self, name: &str, as_hint: bool) -> bool {
		if !self.entries.contains_key(name) {
			return true;
		}
		as_hint && !self.hinted.contains(name)
	}

	pub fn get(&self, name: &str) -> Option<&ScoutedLocation> {
		self.entries.get(name)
	}

	pub fn is_hinted(&self, name: &str) -> bool {
		self.hinted.contains(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Splits `names` into satisfied entries and names that need a request.
	///
	/// Duplicate names are reported once.
	pub fn partition<'a>(
		&self,
		names: impl IntoIterator<Item = &'a str>,
		as_hint: bool,
	) -> (HashMap<String, ScoutedLocation>, Vec<String>) {
		let mut hits = HashMap::new();
		let mut misses = Vec::new();
		for name in names {
			if !self.needs_scout(name, as_hint) {
				if let Some(entry) = self.entries.get(name) {
					hits.insert(name.to_string(), entry.clone());
				}
			} else if !misses.iter().any(|miss| miss == name) {
				misses.push(name.to_string());
			}
		}
		(hits, misses)
	}

	/// Stores `location` under `name` unless an entry exists, and marks hinted scouts.
	///
	/// Returns the entry now stored under `name`.
	pub fn commit(&mut self, name: &str, location: ScoutedLocation, as_hint: bool) -> ScoutedLocation {
		if as_hint {
			self.hinted.insert(name.to_string());
		}
		self.entries
			.entry(name.to_string())
			.or_insert(location)
			.clone()
	}

	/// Commits a server answer for `pending`, pairing entries by position.
	///
	/// A shorter answer leaves the trailing names uncommitted.
	pub fn commit_response(
		&mut self,
		pending: &[(String, i64)],
		response: &[NetworkItem],
		as_hint: bool,
		names: &NameResolver,
		room: &RoomState,
	) -> HashMap<String, ScoutedLocation> {
		if response.len() < pending.len() {
			debug!(
				target = "ap.scout",
				requested = pending.len(),
				answered = response.len(),
				"Scout answer is shorter than the request"
			);
		}

		let mut committed = HashMap::new();
		for ((name, location_id), item) in pending.iter().zip(response) {
			let scouted = scouted_from_item(name, *location_id, item, names, room);
			let stored = self.commit(name, scouted, as_hint);
			committed.insert(name.clone(), stored);
		}
		committed
	}
}

/// Resolves the ids of `names` and keeps those still worth asking about.
///
/// Unknown names, checked locations and locations the slot does not own are
/// dropped.
pub fn scoutable(names: &[String], resolver: &NameResolver, room: &RoomState, game: &str) -> PendingScouts {
	let mut pending = Vec::with_capacity(names.len());
	for name in names {
		let Some(id) = resolver.location_id(Some(room), name, game) else {
			debug!(target = "ap.scout", location = %name, "Not scouting unknown location");
			continue;
		};
		if room.is_checked(id) || !room.is_missing(id) {
			debug!(target = "ap.scout", location = %name, id, "Location is not missing, skipping scout");
			continue;
		}
		pending.push((name.clone(), id));
	}
	pending
}

fn scouted_from_item(
	name: &str,
	location_id: i64,
	item: &NetworkItem,
	names: &NameResolver,
	room: &RoomState,
) -> ScoutedLocation {
	let owner = room.player(item.player);
	let game = room
		.game_of(item.player)
		.unwrap_or(GENERIC_GAME_NAME)
		.to_string();
	let (item_name, player_name) = match owner {
		Some(player) => (names.item_name(Some(room), item.item, &game), player.name.as_str()),
		None => (ScoutedLocation::generic_item_name().to_string(), GENERIC_PLAYER_NAME),
	};

	ScoutedLocation::new(
		name,
		item_name,
		player_name,
		game,
		location_id,
		item.item,
		item.player,
		item.flags,
	)
}

#[cfg(test)]
mod tests {
	use ap_protocol::{GameData, ItemFlags};

	use super::*;
	use crate::names::LocalDataPackage;

	const GAME: &str = "Stardew Valley";
	const OTHER: &str = "Hollow Knight";

	fn room() -> RoomState {
		let mut room = RoomState::new();
		room.set_identity(0, 1);
		room.insert_player(0, 1, "Farmer", GAME);
		room.insert_player(0, 2, "Knight", OTHER);
		room.insert_game_data(
			GAME,
			&GameData {
				location_name_to_id: [
					("Farm Cave".to_string(), 10),
					("Mines Floor 5".to_string(), 11),
					("Done".to_string(), 12),
				]
				.into_iter()
				.collect(),
				..GameData::default()
			},
		);
		room.insert_game_data(
			OTHER,
			&GameData {
				item_name_to_id: [("Mothwing Cloak".to_string(), 500)].into_iter().collect(),
				..GameData::default()
			},
		);
		room.mark_missing([10, 11]);
		room.mark_checked([12]);
		room
	}

	fn resolver() -> NameResolver {
		NameResolver::new(LocalDataPackage::new())
	}

	fn entry(name: &str) -> ScoutedLocation {
		ScoutedLocation::new(name, "Hoe", "Farmer", GAME, 10, 1, 1, ItemFlags::NONE)
	}

	#[test]
	fn hint_scout_upgrades_silent_entry() {
		let mut cache = ScoutCache::new();
		assert!(cache.needs_scout("Farm Cave", false));

		cache.commit("Farm Cave", entry("Farm Cave"), false);
		assert!(!cache.needs_scout("Farm Cave", false));
		assert!(cache.needs_scout("Farm Cave", true));

		cache.commit("Farm Cave", entry("Farm Cave"), true);
		assert!(!cache.needs_scout("Farm Cave", true));
		assert!(cache.is_hinted("Farm Cave"));
	}

	#[test]
	fn commit_keeps_first_entry() {
		let mut cache = ScoutCache::new();
		cache.commit("Farm Cave", entry("Farm Cave"), false);
		let mut other = entry("Farm Cave");
		other.item_name = "Pickaxe".into();
		let stored = cache.commit("Farm Cave", other, true);
		assert_eq!(stored.item_name, "Hoe");
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn partition_dedupes_misses() {
		let mut cache = ScoutCache::new();
		cache.commit("Farm Cave", entry("Farm Cave"), false);
		let (hits, misses) = cache.partition(["Farm Cave", "Mines Floor 5", "Mines Floor 5"], false);
		assert_eq!(hits.len(), 1);
		assert_eq!(misses, vec!["Mines Floor 5".to_string()]);
	}

	#[test]
	fn scoutable_skips_unknown_and_checked() {
		let names = vec![
			"Farm Cave".to_string(),
			"Done".to_string(),
			"Nowhere".to_string(),
			"Mines Floor 5".to_string(),
		];
		let pending = scoutable(&names, &resolver(), &room(), GAME);
		assert_eq!(
			pending,
			vec![("Farm Cave".to_string(), 10), ("Mines Floor 5".to_string(), 11)]
		);
	}

	#[test]
	fn response_is_paired_by_position() {
		let mut cache = ScoutCache::new();
		let pending = vec![("Farm Cave".to_string(), 10), ("Mines Floor 5".to_string(), 11)];
		let response = vec![NetworkItem {
			item: 500,
			location: 10,
			player: 2,
			flags: ItemFlags::ADVANCEMENT,
		}];

		let committed = cache.commit_response(&pending, &response, false, &resolver(), &room());
		assert_eq!(committed.len(), 1);
		let scouted = &committed["Farm Cave"];
		assert_eq!(scouted.item_name, "Mothwing Cloak");
		assert_eq!(scouted.player_name, "Knight");
		assert_eq!(scouted.game_name, OTHER);
		assert_eq!(scouted.location_id, 10);
		assert_eq!(scouted.classification(), ItemClassification::Progression);
		assert!(cache.needs_scout("Mines Floor 5", false));
	}

	#[test]
	fn unknown_owner_gets_generic_names() {
		let mut cache = ScoutCache::new();
		let pending = vec![("Farm Cave".to_string(), 10)];
		let response = vec![NetworkItem {
			item: 9,
			location: 10,
			player: 42,
			flags: ItemFlags::NONE,
		}];
		let committed = cache.commit_response(&pending, &response, false, &resolver(), &room());
		assert_eq!(committed["Farm Cave"].player_name, GENERIC_PLAYER_NAME);
		assert_eq!(committed["Farm Cave"].game_name, GENERIC_GAME_NAME);
		assert_eq!(committed["Farm Cave"].item_name, ScoutedLocation::generic_item_name());
	}
}
