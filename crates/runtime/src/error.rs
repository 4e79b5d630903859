//! Error types for the session runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a multiworld server.
#[derive(Debug, Error)]
pub enum Error {
	/// Failed to open a socket to the server.
	#[error("Failed to connect to {address}: {reason}")]
	ConnectionFailed { address: String, reason: String },

	/// Transport-level error (socket read/write).
	#[error("Transport error: {0}")]
	Transport(String),

	/// The server sent something this client cannot make sense of.
	#[error("Protocol error: {0}")]
	Protocol(String),

	/// Timeout waiting for a server reply.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// Channel closed unexpectedly.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// Operation requires a logged-in session.
	#[error("Not connected to a server")]
	NotConnected,

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// WebSocket handshake or framing error.
	#[error("WebSocket error: {0}")]
	WebSocket(String),
}

impl Error {
	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Returns true if the error means the session is gone.
	pub fn is_disconnect(&self) -> bool {
		matches!(
			self,
			Error::ChannelClosed | Error::NotConnected | Error::Transport(_) | Error::WebSocket(_)
		)
	}
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
	fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
		Error::WebSocket(err.to_string())
	}
}
