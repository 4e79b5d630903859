//! Session runtime for Archipelago multiworld clients.
//!
//! This crate sits between the client core and the network:
//!
//! - **Session surface**: [`Connector`] and [`Session`] traits plus the [`SessionEvent`] queue
//! - **Room state**: [`RoomState`], the client's view of players, locations and data packages
//! - **Transport**: JSON packet framing over WebSocket
//! - **Connection**: [`WebSocketSession`], the WebSocket implementation of [`Session`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │    ap-rs    │  Client core (supervisor, scout cache, names)
//! └──────┬──────┘
//!        │ uses dyn Connector / dyn Session
//! ┌──────▼──────┐
//! │ ap-runtime  │  This crate
//! │  ┌────────┐ │
//! │  │ Conn   │ │  Login, scouts, hints, events
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Trans  │ │  WebSocket framing
//! │  └────────┘ │
//! └─────────────┘
//! ```

pub mod connection;
pub mod error;
pub mod room;
pub mod session;
pub mod transport;

pub use connection::{TransportConfig, WebSocketConnector, WebSocketSession};
pub use error::{Error, Result};
pub use room::{PlayerInfo, RoomHandle, RoomState};
pub use session::{
	BoxFuture, Connector, LogMessage, LoginRequest, LoginResult, Session, SessionEvent,
	describe_refusal,
};
pub use transport::{Inbound, TransportReceiver, TransportSender};
