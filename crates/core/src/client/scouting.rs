//! Scouting through the cache.

use std::collections::HashMap;

use ap_protocol::HintCreationPolicy;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::Client;
use crate::scout::{ScoutedLocation, scoutable};

impl Client {
	/// What sits at location `name` of this game.
	///
	/// Cached answers come back without I/O. With `as_hint`, the server also
	/// records and announces a hint, once per location. Returns `None` when
	/// the location is unknown, already checked, or the server is unreachable.
	pub async fn scout_one(&self, name: &str, as_hint: bool) -> Option<ScoutedLocation> {
		let mut found = self.scout_many(&[name], as_hint).await;
		found.remove(name)
	}

	/// [`scout_one`](Self::scout_one) by location id.
	pub async fn scout_one_by_id(&self, location_id: i64, as_hint: bool) -> Option<ScoutedLocation> {
		let name = self.my_location_name(location_id);
		self.scout_one(&name, as_hint).await
	}

	/// Scouts several locations of this game with at most one request.
	///
	/// Names that cannot be scouted are left out of the result.
	///
	/// Concurrent callers wait for each other, and a caller that waited sees
	/// what the previous one cached.
	pub async fn scout_many(&self, names: &[&str], as_hint: bool) -> HashMap<String, ScoutedLocation> {
		let (found, misses) = self.partition_scouts(names, as_hint);
		if misses.is_empty() {
			return found;
		}

		let _gate = self.shared.scout_gate.lock().await;
		let (mut found, misses) = self.partition_scouts(names, as_hint);
		if misses.is_empty() {
			return found;
		}

		let Some(session) = self.usable_session().await else {
			warn!(
				target = "ap.scout",
				count = misses.len(),
				"Could not scout locations, not connected to Archipelago"
			);
			return found;
		};
		let room = session.room();
		let pending = scoutable(&misses, self.names(), &room.read(), self.game_name());
		if pending.is_empty() {
			return found;
		}

		let policy = HintCreationPolicy::for_hint(as_hint);
		let ids = pending.iter().map(|(_, id)| *id).collect();
		let request_timeout = self.config().request_timeout;
		debug!(target = "ap.scout", count = pending.len(), as_hint, "Scouting locations");

		let response = match timeout(request_timeout, session.scout_locations(policy, ids)).await {
			Ok(Ok(response)) => response,
			Ok(Err(e)) if e.is_disconnect() => {
				warn!(target = "ap.scout", error = %e, "Session went away while scouting");
				return found;
			}
			Ok(Err(e)) => {
				error!(target = "ap.scout", error = %e, "Failed to scout locations");
				return found;
			}
			Err(_) => {
				error!(target = "ap.scout", timeout = ?request_timeout, "Timed out scouting locations");
				return found;
			}
		};
		if response.is_empty() {
			info!(target = "ap.scout", count = pending.len(), "Server returned nothing for scouted locations");
			return found;
		}

		let committed = self.shared.scouts.lock().commit_response(
			&pending,
			&response,
			as_hint,
			self.names(),
			&room.read(),
		);
		found.extend(committed);
		found
	}

	fn partition_scouts(&self, names: &[&str], as_hint: bool) -> (HashMap<String, ScoutedLocation>, Vec<String>) {
		self.shared.scouts.lock().partition(names.iter().copied(), as_hint)
	}

	/// Cached scout of location `name`, without I/O.
	pub fn cached_scout(&self, name: &str) -> Option<ScoutedLocation> {
		self.shared.scouts.lock().get(name).cloned()
	}
}
