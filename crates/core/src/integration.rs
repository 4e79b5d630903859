//! Game-specific hooks injected into the client.

use serde_json::{Map, Value};

use crate::slot_data::SlotData;

/// What the client needs to know about the game it runs in.
///
/// Only the identity methods are required. The rest have working defaults.
pub trait GameIntegration: Send + Sync {
	/// Game name as registered with the server.
	fn game_name(&self) -> &str;

	/// Name of the mod, for version messages.
	fn mod_name(&self) -> &str;

	/// Dotted `major.minor.fix` version of the mod.
	fn mod_version(&self) -> &str;

	/// Parses slot data received at login.
	fn parse_slot_data(&self, slot_name: &str, fields: &Map<String, Value>) -> SlotData {
		SlotData::from_fields(slot_name, fields)
	}

	/// Called when the connection is lost.
	fn on_error(&self, _message: &str) {}

	/// Called when an automatic reconnection succeeded.
	fn on_reconnect_success(&self) {}

	/// Called when an automatic reconnection failed.
	fn on_reconnect_failure(&self) {}
}

/// A [`GameIntegration`] with fixed identity and default hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIntegration {
	pub game: String,
	pub mod_name: String,
	pub mod_version: String,
}

impl StaticIntegration {
	pub fn new(
		game: impl Into<String>,
		mod_name: impl Into<String>,
		mod_version: impl Into<String>,
	) -> Self {
		Self {
			game: game.into(),
			mod_name: mod_name.into(),
			mod_version: mod_version.into(),
		}
	}
}

impl GameIntegration for StaticIntegration {
	fn game_name(&self) -> &str {
		&self.game
	}

	fn mod_name(&self) -> &str {
		&self.mod_name
	}

	fn mod_version(&self) -> &str {
		&self.mod_version
	}
}
