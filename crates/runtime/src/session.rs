//! Capability surface between the client core and a transport.
//!
//! A [`Connector`] opens [`Session`]s. A session performs the login handshake,
//! answers scout and hint requests, and pushes everything the server sends as
//! [`SessionEvent`]s into a queue handed out once by [`Session::subscribe`].
//!
//! The core only ever sees these traits, so tests can drive it with an
//! in-memory session.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ap_protocol::{
	Bounced, ClientPacket, Hint, HintCreationPolicy, ItemsHandling, NetworkItem, NetworkVersion,
	ServerPacket,
};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::room::RoomHandle;

/// Boxed future returned by the object-safe session traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opens sessions against a server address.
pub trait Connector: Send + Sync {
	/// Opens a transport session to `host:port`.
	///
	/// The returned session is connected but not logged in.
	fn create_session(&self, host: &str, port: u16) -> BoxFuture<'_, Result<Arc<dyn Session>>>;
}

/// One open connection to a multiworld server.
pub trait Session: Send + Sync {
	/// Performs the `Connect` handshake for one slot.
	fn login(&self, request: LoginRequest) -> BoxFuture<'_, Result<LoginResult>>;

	/// Takes the event queue. Returns `None` after the first call.
	///
	/// Events produced before the first call are buffered.
	fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<SessionEvent>>;

	/// Stops producing events. The queue handed out by `subscribe` then closes.
	fn unsubscribe(&self);

	/// Queues a packet for sending.
	fn send_packet(&self, packet: ClientPacket) -> Result<()>;

	/// Asks the server what sits at `locations` and waits for the answer.
	///
	/// Entries come back in request order. The server omits locations it does
	/// not know, so the answer may be shorter than the request.
	fn scout_locations(
		&self,
		policy: HintCreationPolicy,
		locations: Vec<i64>,
	) -> BoxFuture<'_, Result<Vec<NetworkItem>>>;

	/// Reads the hints known for this slot.
	fn hints(&self) -> BoxFuture<'_, Result<Vec<Hint>>>;

	/// Closes the socket. Idempotent.
	fn disconnect(&self) -> BoxFuture<'_, ()>;

	/// Shared view of the room this session is connected to.
	fn room(&self) -> RoomHandle;
}

/// Parameters of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
	pub game: String,
	pub slot_name: String,
	pub password: Option<String>,
	pub items_handling: ItemsHandling,
	pub version: NetworkVersion,
	pub tags: Vec<String>,
	pub uuid: String,
}

impl LoginRequest {
	/// Builds the `Connect` packet for this request.
	pub fn to_packet(&self) -> ClientPacket {
		ClientPacket::Connect(ap_protocol::Connect {
			password: self.password.clone(),
			game: self.game.clone(),
			name: self.slot_name.clone(),
			uuid: self.uuid.clone(),
			version: self.version,
			items_handling: self.items_handling,
			tags: self.tags.clone(),
			slot_data: true,
		})
	}
}

/// Outcome of [`Session::login`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoginResult {
	Success {
		team: i64,
		slot: i64,
		slot_data: Map<String, Value>,
	},
	Failure {
		/// Human-readable reasons.
		errors: Vec<String>,
		/// Raw error codes as sent by the server.
		error_codes: Vec<String>,
	},
}

impl LoginResult {
	pub fn is_success(&self) -> bool {
		matches!(self, LoginResult::Success { .. })
	}

	/// Builds a failure from the raw `ConnectionRefused` codes.
	pub fn refused(codes: Vec<String>) -> Self {
		let errors = codes.iter().map(|code| describe_refusal(code)).collect();
		LoginResult::Failure {
			errors,
			error_codes: codes,
		}
	}
}

/// Maps a `ConnectionRefused` code to a sentence.
pub fn describe_refusal(code: &str) -> String {
	match code {
		"InvalidSlot" => "The slot name did not match any slot on the server.".to_string(),
		"InvalidGame" => "The slot is set to a different game on the server.".to_string(),
		"SlotAlreadyTaken" => {
			"The slot already has a connection with a different uuid established.".to_string()
		}
		"IncompatibleVersion" => "The client and server version mismatch.".to_string(),
		"InvalidPassword" => "The password is invalid.".to_string(),
		"InvalidItemsHandling" => "The item handling flags provided are invalid.".to_string(),
		other => other.to_string(),
	}
}

/// A server message rendered to plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
	/// `PrintJSON` type, e.g. `"ItemSend"` or `"Chat"`.
	pub kind: Option<String>,
	pub text: String,
}

/// Everything a session reports to its subscriber, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
	/// Items handed to this slot. `index` is the position of the first item
	/// in the slot's received-items list; 0 means a full resend.
	ItemsReceived { index: u64, items: Vec<NetworkItem> },
	Message(LogMessage),
	/// Every packet, before any typed event derived from it.
	Packet(ServerPacket),
	Bounced(Bounced),
	SocketError(String),
	SocketClosed(String),
}

impl SessionEvent {
	/// Returns true for events that end the session.
	pub fn is_fault(&self) -> bool {
		matches!(self, SessionEvent::SocketError(_) | SessionEvent::SocketClosed(_))
	}
}
