//! Where and as whom to connect.

use serde::{Deserialize, Serialize};

/// Address and credentials of one slot.
///
/// `death_link` is tri-state: `None` defers to the slot's own preference as
/// sent by the server at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
	pub host: String,
	pub port: u16,
	pub slot_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub death_link: Option<bool>,
}

impl ConnectionInfo {
	pub fn new(host: impl Into<String>, port: u16, slot_name: impl Into<String>) -> Self {
		Self {
			host: host.into(),
			port,
			slot_name: slot_name.into(),
			password: None,
			death_link: None,
		}
	}

	/// Sets the room password. An empty string means no password.
	pub fn with_password(mut self, password: impl Into<String>) -> Self {
		let password = password.into();
		self.password = if password.is_empty() { None } else { Some(password) };
		self
	}

	pub fn with_death_link(mut self, enabled: bool) -> Self {
		self.death_link = Some(enabled);
		self
	}

	/// `host:port`, for messages.
	pub fn address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn loads_from_minimal_json() {
		let info: ConnectionInfo =
			serde_json::from_str(r#"{"host": "archipelago.gg", "port": 38281, "slot_name": "Farmer"}"#)
				.unwrap();
		assert_eq!(info.address(), "archipelago.gg:38281");
		assert_eq!(info.password, None);
		assert_eq!(info.death_link, None);
	}

	#[test]
	fn empty_password_is_none() {
		let info = ConnectionInfo::new("localhost", 38281, "Farmer").with_password("");
		assert_eq!(info.password, None);
		let info = info.with_password("hunter2").with_death_link(false);
		assert_eq!(info.password.as_deref(), Some("hunter2"));
		assert_eq!(info.death_link, Some(false));
	}
}
