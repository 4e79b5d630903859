//! Hint queries.

use ap_protocol::{Hint, HintStatus};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::Client;

impl Client {
	/// Hints known for this slot.
	///
	/// Bounded by the hint timeout. Returns an empty list on any failure.
	pub async fn hints(&self) -> Vec<Hint> {
		let Some(session) = self.usable_session().await else {
			return Vec::new();
		};
		let bound = self.config().hint_timeout;
		match timeout(bound, session.hints()).await {
			Ok(Ok(hints)) => hints,
			Ok(Err(e)) if e.is_timeout() => {
				debug!(target = "ap.hints", error = %e, "Server did not answer the hint request");
				Vec::new()
			}
			Ok(Err(e)) => {
				warn!(target = "ap.hints", error = %e, "Failed to read hints");
				Vec::new()
			}
			Err(_) => {
				debug!(target = "ap.hints", timeout = ?bound, "Timed out reading hints");
				Vec::new()
			}
		}
	}

	/// Unfound hints for items sitting in this slot's world.
	pub async fn my_active_hints(&self) -> Vec<Hint> {
		let hints = self.hints().await;
		if hints.is_empty() {
			return hints;
		}
		let Some(room) = self.live_room() else {
			return Vec::new();
		};
		let own_slot = room.read().slot();
		hints
			.into_iter()
			.filter(|hint| !hint.found && hint.finding_player == own_slot)
			.collect()
	}

	/// Active hints the receiver marked as wanted.
	pub async fn my_active_desired_hints(&self) -> Vec<Hint> {
		self.my_active_hints_matching(&[HintStatus::Priority]).await
	}

	/// Active hints the receiver marked to avoid.
	pub async fn my_active_avoided_hints(&self) -> Vec<Hint> {
		self.my_active_hints_matching(&[HintStatus::Avoid]).await
	}

	pub async fn my_active_hints_matching(&self, statuses: &[HintStatus]) -> Vec<Hint> {
		self.my_active_hints()
			.await
			.into_iter()
			.filter(|hint| statuses.contains(&hint.status))
			.collect()
	}

	/// Name of the location a hint points at, in the finding player's game.
	pub fn hint_location_name(&self, hint: &Hint) -> String {
		let game = match self.live_room() {
			Some(room) => {
				let room = room.read();
				room.game_of(hint.finding_player).map(str::to_string)
			}
			None => None,
		};
		let game = game.unwrap_or_else(|| self.game_name().to_string());
		self.location_name(hint.location, &game)
	}
}
