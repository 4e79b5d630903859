//! Location queries and check reporting.

use std::collections::HashMap;

use ap_protocol::ClientPacket;
use tracing::{debug, warn};

use super::Client;

impl Client {
	/// Tells the server these locations of this game were checked.
	pub async fn report_locations_checked(&self, location_ids: &[i64]) {
		if location_ids.is_empty() {
			return;
		}
		let Some(session) = self.usable_session().await else {
			warn!(
				target = "ap.session",
				count = location_ids.len(),
				"Could not report checked locations, not connected to Archipelago"
			);
			return;
		};
		debug!(target = "ap.session", locations = ?location_ids, "Reporting checked locations");
		if let Err(e) = session.send_packet(ClientPacket::LocationChecks {
			locations: location_ids.to_vec(),
		}) {
			warn!(target = "ap.session", error = %e, "Failed to report checked locations");
			return;
		}
		session.room().write().mark_checked(location_ids.iter().copied());
	}

	/// Checked locations of this slot, by name.
	pub async fn all_checked_locations(&self) -> HashMap<String, i64> {
		let Some(room) = self.usable_room().await else {
			return HashMap::new();
		};
		let ids = room.read().checked_locations();
		self.named_locations(ids)
	}

	pub async fn all_missing_locations(&self) -> Vec<i64> {
		match self.usable_room().await {
			Some(room) => room.read().missing_locations(),
			None => Vec::new(),
		}
	}

	pub async fn all_missing_location_names(&self) -> Vec<String> {
		let ids = self.all_missing_locations().await;
		ids.into_iter().map(|id| self.my_location_name(id)).collect()
	}

	/// Every location of this slot, checked or not, by name.
	pub async fn all_locations(&self) -> HashMap<String, i64> {
		let Some(room) = self.usable_room().await else {
			return HashMap::new();
		};
		let ids = room.read().all_locations();
		self.named_locations(ids)
	}

	pub async fn all_location_names(&self) -> Vec<String> {
		let Some(room) = self.usable_room().await else {
			return Vec::new();
		};
		let ids = room.read().all_locations();
		ids.into_iter().map(|id| self.my_location_name(id)).collect()
	}

	/// Returns true if this slot has a location called `name`.
	pub async fn location_exists(&self, name: &str) -> bool {
		let Some(room) = self.usable_room().await else {
			return false;
		};
		let Some(id) = self.location_id(name) else {
			return false;
		};
		let room = room.read();
		room.is_checked(id) || room.is_missing(id)
	}

	fn named_locations(&self, ids: Vec<i64>) -> HashMap<String, i64> {
		ids.into_iter()
			.map(|id| (self.my_location_name(id), id))
			.collect()
	}
}
