//! Inbound event handlers and outbound signals.

use std::future::Future;

use ap_protocol::{Bounce, ClientPacket, ClientStatus, ServerPacket};
use ap_runtime::{Error, LogMessage, Result, Session};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::Client;
use crate::death_signal::{DEATH_LINK_TAG, DeathSignal, MOVE_LINK_TAG, UNKNOWN_CAUSE, set_session_tag};
use crate::handlers::{Subscription, register};
use crate::signals::ItemBatch;

impl Client {
	/// Registers a handler for received items.
	///
	/// Handlers run on the event pump, in arrival order. Returns a
	/// [`Subscription`] that unregisters the handler when dropped.
	pub fn on_item_received<F, Fut>(&self, handler: F) -> Subscription
	where
		F: Fn(ItemBatch) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<()>> + Send + 'static,
	{
		register(&self.shared.signals.items, handler)
	}

	/// Registers a handler for chat and server log messages.
	pub fn on_message<F, Fut>(&self, handler: F) -> Subscription
	where
		F: Fn(LogMessage) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<()>> + Send + 'static,
	{
		register(&self.shared.signals.messages, handler)
	}

	/// Registers a handler for every packet the server sends.
	pub fn on_packet<F, Fut>(&self, handler: F) -> Subscription
	where
		F: Fn(ServerPacket) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<()>> + Send + 'static,
	{
		register(&self.shared.signals.packets, handler)
	}

	/// Registers a handler for deaths of linked players.
	///
	/// Only called while death link is enabled.
	pub fn on_death_signal<F, Fut>(&self, handler: F) -> Subscription
	where
		F: Fn(DeathSignal) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<()>> + Send + 'static,
	{
		register(&self.shared.signals.deaths, handler)
	}

	pub async fn send_chat_message(&self, text: &str) {
		self.send_gated(ClientPacket::Say { text: text.to_string() }, "chat message")
			.await;
	}

	/// Tells the server this slot reached its goal.
	pub async fn report_goal_complete(&self) {
		self.send_gated(
			ClientPacket::StatusUpdate {
				status: ClientStatus::Goal,
			},
			"goal completion",
		)
		.await;
	}

	/// Relays `data` to every client connected with one of `tags`.
	pub async fn send_bounce(&self, tags: Vec<String>, data: Map<String, Value>) {
		self.send_gated(ClientPacket::Bounce(Bounce::to_tags(tags, data)), "bounce")
			.await;
	}

	/// Asks the server to resend every received item.
	pub async fn sync(&self) {
		if !self.ensure_usable_within(std::time::Duration::ZERO).await {
			warn!(target = "ap.session", "Could not sync, not connected to Archipelago");
			return;
		}
		self.send_gated(ClientPacket::Sync, "sync").await;
	}

	/// Tells linked players this player died.
	pub async fn send_death_signal(&self, reason: Option<&str>) {
		let reason = reason.unwrap_or(UNKNOWN_CAUSE);
		let Some(session) = self.usable_session().await else {
			warn!(target = "ap.signals", "Could not send death signal, not connected to Archipelago");
			return;
		};
		info!(target = "ap.signals", "Sending a death signal with reason [{reason}]");

		let source = self.current_player_name().await;
		let signal = DeathSignal::new(source, Some(reason.to_string()));
		self.shared.signals.death_link().record_sent(&signal);
		if let Err(e) = session.send_packet(ClientPacket::Bounce(signal.to_bounce())) {
			warn!(target = "ap.signals", error = %e, "Failed to send death signal");
		}
	}

	/// [`send_death_signal`](Self::send_death_signal) on a detached task.
	pub fn send_death_signal_detached(&self, reason: Option<String>) {
		let client = self.clone();
		tokio::spawn(async move {
			client.send_death_signal(reason.as_deref()).await;
		});
	}

	/// Flips the death-link preference and the session's tag.
	///
	/// # Errors
	///
	/// Returns [`Error::NotConnected`] when there is no live session.
	pub fn toggle_death_link(&self) -> Result<bool> {
		let session = self.shared.supervisor.session().ok_or(Error::NotConnected)?;
		let death_link = self.shared.signals.death_link();
		let enabled = !death_link.is_enabled();

		set_session_tag(session.as_ref(), DEATH_LINK_TAG, enabled)?;
		death_link.set_enabled(enabled);
		self.shared.supervisor.set_death_link(enabled);
		debug!(target = "ap.signals", enabled, "Toggled death link");
		Ok(enabled)
	}

	/// Shares a movement with other clients of `slot`'s player.
	pub async fn send_move_link(&self, slot: &str, timespan: f32, x: f32, y: f32) {
		let Some(session) = self.usable_session().await else {
			warn!(target = "ap.signals", "Could not send move link, not connected to Archipelago");
			return;
		};
		if let Err(e) = set_session_tag(session.as_ref(), MOVE_LINK_TAG, true) {
			warn!(target = "ap.signals", error = %e, "Failed to enable move link tag");
			return;
		}

		let data = json!({
			"slot": slot,
			"timespan": timespan,
			"x": x,
			"y": y,
		});
		let data = data.as_object().cloned().unwrap_or_default();
		send_or_warn(
			session.as_ref(),
			ClientPacket::Bounce(Bounce::to_tags(vec![MOVE_LINK_TAG.to_string()], data)),
			"move link",
		);
	}

	async fn send_gated(&self, packet: ClientPacket, what: &'static str) {
		let Some(session) = self.usable_session().await else {
			warn!(target = "ap.session", what, "Could not send, not connected to Archipelago");
			return;
		};
		send_or_warn(session.as_ref(), packet, what);
	}
}

fn send_or_warn(session: &dyn Session, packet: ClientPacket, what: &'static str) {
	if let Err(e) = session.send_packet(packet) {
		warn!(target = "ap.session", what, error = %e, "Failed to send");
	}
}
