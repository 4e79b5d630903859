//! Received item queries.

use std::collections::HashMap;

use ap_runtime::RoomState;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::names::NameResolver;
use crate::scout::{GENERIC_GAME_NAME, GENERIC_PLAYER_NAME};

/// An item this slot received, with names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedItem {
	/// Location in the sender's world.
	pub location_name: String,
	pub item_name: String,
	/// Player who found the item.
	pub player_name: String,
	pub location_id: i64,
	pub item_id: i64,
	pub player_id: i64,
	/// Position in the slot's received list.
	pub index: usize,
}

impl Client {
	/// Every item received so far, in server order.
	pub async fn all_received_items(&self) -> Vec<ReceivedItem> {
		let Some(room) = self.usable_room().await else {
			return Vec::new();
		};
		let room = room.read();
		resolve_received(&room, self.names(), self.game_name())
	}

	/// How many of each item were received, by item name.
	pub async fn received_item_counts(&self) -> HashMap<String, usize> {
		let mut counts = HashMap::new();
		for item in self.all_received_items().await {
			*counts.entry(item.item_name).or_insert(0) += 1;
		}
		counts
	}

	/// Sender of the first received item called `name`, if any.
	pub async fn has_received_item(&self, name: &str, ignore_case: bool) -> Option<String> {
		self.all_received_items()
			.await
			.into_iter()
			.find(|item| {
				if ignore_case {
					item.item_name.eq_ignore_ascii_case(name)
				} else {
					item.item_name == name
				}
			})
			.map(|item| item.player_name)
	}

	pub async fn received_item_count(&self, name: &str) -> usize {
		self.all_received_items()
			.await
			.iter()
			.filter(|item| item.item_name == name)
			.count()
	}
}

fn resolve_received(room: &RoomState, names: &NameResolver, game: &str) -> Vec<ReceivedItem> {
	room.received_items()
		.iter()
		.enumerate()
		.map(|(index, item)| {
			let sender_game = room.game_of(item.player).unwrap_or(GENERIC_GAME_NAME);
			ReceivedItem {
				location_name: names.location_name(Some(room), item.location, sender_game),
				item_name: names.item_name(Some(room), item.item, game),
				player_name: room
					.player(item.player)
					.map_or(GENERIC_PLAYER_NAME, |player| player.name.as_str())
					.to_string(),
				location_id: item.location,
				item_id: item.item,
				player_id: item.player,
				index,
			}
		})
		.collect()
}
