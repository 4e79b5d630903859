//! Fan-out of session events to registered handlers.

use ap_protocol::{NetworkItem, ServerPacket};
use ap_runtime::{LogMessage, SessionEvent};
use tracing::{debug, info};

use crate::death_signal::{DeathLinkState, DeathSignal};
use crate::handlers::{HandlerMap, dispatch, handler_map};

/// Items received in one `ReceivedItems` packet.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBatch {
	/// Position of the first item in the slot's received list. 0 means a resend.
	pub index: u64,
	pub items: Vec<NetworkItem>,
}

/// Handler maps for every event kind forwarded to the game.
pub struct SignalHub {
	pub(crate) items: HandlerMap<ItemBatch>,
	pub(crate) messages: HandlerMap<LogMessage>,
	pub(crate) packets: HandlerMap<ServerPacket>,
	pub(crate) deaths: HandlerMap<DeathSignal>,
	pub(crate) death_link: DeathLinkState,
}

impl Default for SignalHub {
	fn default() -> Self {
		Self {
			items: handler_map(),
			messages: handler_map(),
			packets: handler_map(),
			deaths: handler_map(),
			death_link: DeathLinkState::default(),
		}
	}
}

impl SignalHub {
	pub fn death_link(&self) -> &DeathLinkState {
		&self.death_link
	}

	/// Routes one non-fault event. Handlers run in registration order.
	pub async fn forward(&self, event: SessionEvent) {
		match event {
			SessionEvent::ItemsReceived { index, items } => {
				debug!(target = "ap.signals", index, count = items.len(), "Items received");
				dispatch(&self.items, &ItemBatch { index, items }, "items").await;
			}
			SessionEvent::Message(message) => {
				dispatch(&self.messages, &message, "message").await;
			}
			SessionEvent::Packet(packet) => {
				dispatch(&self.packets, &packet, "packet").await;
			}
			SessionEvent::Bounced(bounced) => {
				let Some(signal) = DeathSignal::from_bounced(&bounced) else {
					return;
				};
				if !self.death_link.accepts(&signal) {
					return;
				}
				info!(
					target = "ap.signals",
					"You have been killed by {} ({})",
					signal.source,
					signal.cause.as_deref().unwrap_or_default()
				);
				dispatch(&self.deaths, &signal, "death").await;
			}
			SessionEvent::SocketError(_) | SessionEvent::SocketClosed(_) => {}
		}
	}
}
