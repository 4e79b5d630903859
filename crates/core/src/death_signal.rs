//! Death link and other tag-addressed bounces.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use ap_protocol::{Bounce, Bounced, ClientPacket};
use ap_runtime::Session;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tracing::debug;

pub const DEATH_LINK_TAG: &str = "DeathLink";
pub const MOVE_LINK_TAG: &str = "MoveLink";
/// Cause used when a death is sent without a reason.
pub const UNKNOWN_CAUSE: &str = "Unknown cause";

/// A player death shared between linked slots.
#[derive(Debug, Clone, PartialEq)]
pub struct DeathSignal {
	/// Name of the player who died.
	pub source: String,
	pub cause: Option<String>,
	/// Unix time in seconds. Identifies the death.
	pub time: f64,
}

impl DeathSignal {
	pub fn new(source: impl Into<String>, cause: Option<String>) -> Self {
		let time = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_secs_f64())
			.unwrap_or_default();
		Self {
			source: source.into(),
			cause,
			time,
		}
	}

	/// Reads a death from a bounce tagged [`DEATH_LINK_TAG`].
	pub fn from_bounced(bounced: &Bounced) -> Option<Self> {
		if !bounced.has_tag(DEATH_LINK_TAG) {
			return None;
		}
		let source = bounced.data.get("source")?.as_str()?.to_string();
		let time = bounced.data.get("time").and_then(Value::as_f64).unwrap_or_default();
		let cause = bounced
			.data
			.get("cause")
			.and_then(Value::as_str)
			.filter(|cause| !cause.is_empty())
			.map(str::to_string);
		Some(Self { source, cause, time })
	}

	pub fn to_bounce(&self) -> Bounce {
		let mut data = Map::new();
		data.insert("time".into(), json!(self.time));
		data.insert("source".into(), json!(self.source));
		if let Some(cause) = &self.cause {
			data.insert("cause".into(), json!(cause));
		}
		Bounce::to_tags(vec![DEATH_LINK_TAG.to_string()], data)
	}
}

/// Whether incoming deaths are applied, and which death this client sent last.
#[derive(Debug, Default)]
pub struct DeathLinkState {
	enabled: AtomicBool,
	last_sent: Mutex<Option<f64>>,
}

impl DeathLinkState {
	pub fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::SeqCst)
	}

	pub fn set_enabled(&self, enabled: bool) {
		self.enabled.store(enabled, Ordering::SeqCst);
	}

	pub fn record_sent(&self, signal: &DeathSignal) {
		*self.last_sent.lock() = Some(signal.time);
	}

	/// Returns true if `signal` should reach the game.
	///
	/// Deaths are dropped while disabled, and the server echo of our own last
	/// death is dropped too.
	pub fn accepts(&self, signal: &DeathSignal) -> bool {
		if !self.is_enabled() {
			return false;
		}
		let echo = *self.last_sent.lock() == Some(signal.time);
		if echo {
			debug!(target = "ap.signals", source = %signal.source, "Ignoring echo of our own death");
		}
		!echo
	}
}

/// Tags after turning `tag` on or off, or `None` if nothing changes.
pub fn toggled_tags(tags: &[String], tag: &str, enabled: bool) -> Option<Vec<String>> {
	let present = tags.iter().any(|t| t == tag);
	match (present, enabled) {
		(false, true) => {
			let mut tags = tags.to_vec();
			tags.push(tag.to_string());
			Some(tags)
		}
		(true, false) => Some(tags.iter().filter(|t| *t != tag).cloned().collect()),
		_ => None,
	}
}

/// Turns `tag` on or off for `session`, sending `ConnectUpdate` if needed.
///
/// Returns true if an update was sent.
pub fn set_session_tag(session: &dyn Session, tag: &str, enabled: bool) -> ap_runtime::Result<bool> {
	let room = session.room();
	let current = room.read().tags().to_vec();
	let Some(tags) = toggled_tags(&current, tag, enabled) else {
		return Ok(false);
	};
	debug!(target = "ap.signals", %tag, enabled, "Updating connection tags");
	session.send_packet(ClientPacket::ConnectUpdate {
		items_handling: None,
		tags: Some(tags.clone()),
	})?;
	room.write().set_tags(tags);
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bounce_carries_source_and_cause() {
		let signal = DeathSignal {
			source: "Farmer".into(),
			cause: Some("Fell down a mine shaft".into()),
			time: 1700000000.5,
		};
		let bounce = signal.to_bounce();
		assert_eq!(bounce.tags, Some(vec![DEATH_LINK_TAG.to_string()]));
		assert_eq!(bounce.data["source"], "Farmer");

		let bounced = Bounced {
			tags: bounce.tags.clone(),
			data: bounce.data.clone(),
			..Bounced::default()
		};
		assert_eq!(DeathSignal::from_bounced(&bounced), Some(signal));
	}

	#[test]
	fn untagged_bounce_is_not_a_death() {
		let bounced = Bounced {
			tags: Some(vec![MOVE_LINK_TAG.into()]),
			data: json!({"source": "Farmer"}).as_object().cloned().unwrap_or_default(),
			..Bounced::default()
		};
		assert!(DeathSignal::from_bounced(&bounced).is_none());
	}

	#[test]
	fn state_drops_echo_and_disabled() {
		let state = DeathLinkState::default();
		let signal = DeathSignal::new("Farmer", None);
		assert!(!state.accepts(&signal));

		state.set_enabled(true);
		assert!(state.accepts(&signal));
		state.record_sent(&signal);
		assert!(!state.accepts(&signal));
	}

	#[test]
	fn toggled_tags_only_reports_changes() {
		let tags = vec!["AP".to_string()];
		assert_eq!(toggled_tags(&tags, DEATH_LINK_TAG, false), None);
		let on = toggled_tags(&tags, DEATH_LINK_TAG, true).unwrap();
		assert_eq!(on, vec!["AP", "DeathLink"]);
		assert_eq!(toggled_tags(&on, DEATH_LINK_TAG, true), None);
		assert_eq!(toggled_tags(&on, DEATH_LINK_TAG, false).unwrap(), vec!["AP"]);
	}
}
