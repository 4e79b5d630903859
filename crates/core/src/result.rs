//! Outcome of a connection attempt.

use std::fmt;

/// Result of [`Client::connect`](crate::Client::connect).
///
/// Every variant renders to a message fit for showing to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionResult {
	Success {
		message: String,
	},
	/// Session could not be opened or the server refused the login.
	Timeout {
		message: String,
	},
	ClientOutdated {
		mod_name: String,
		mod_version: String,
		required: String,
	},
	ClientTooNew {
		mod_name: String,
		mod_version: String,
		required: String,
	},
	/// The multiworld version in slot data could not be read.
	VersionMalformed {
		details: String,
	},
}

impl ConnectionResult {
	pub fn is_success(&self) -> bool {
		matches!(self, ConnectionResult::Success { .. })
	}

	pub fn message(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for ConnectionResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConnectionResult::Success { message } | ConnectionResult::Timeout { message } => {
				f.write_str(message)
			}
			ConnectionResult::ClientOutdated {
				mod_name,
				mod_version,
				required,
			} => write!(
				f,
				"{mod_name} {mod_version} is too old for this multiworld, which requires version {required}. Please update the mod."
			),
			ConnectionResult::ClientTooNew {
				mod_name,
				mod_version,
				required,
			} => write!(
				f,
				"{mod_name} {mod_version} is too recent for this multiworld, which was generated for version {required}. Please install a matching version of the mod."
			),
			ConnectionResult::VersionMalformed { details } => {
				write!(f, "Could not verify the multiworld version: {details}")
			}
		}
	}
}
