//! Wire types for the Archipelago multiworld protocol.
//!
//! Everything here is plain data: serde structs and enums matching the JSON
//! packets exchanged between a game client and a multiworld server. Packets
//! travel as JSON arrays of objects tagged with a `"cmd"` field.
//!
//! # Main Types
//!
//! - [`ClientPacket`] - packets sent by this client
//! - [`ServerPacket`] - packets received from the server
//! - [`NetworkItem`] / [`ItemFlags`] - item placements and their classification bits
//! - [`Hint`] / [`HintStatus`] / [`HintCreationPolicy`] - hint data and scouting policy
//! - [`GameData`] - per-game id/name tables (the "data package")

pub mod data_package;
pub mod hints;
pub mod items;
pub mod message;
pub mod packets;
pub mod players;
pub mod version;

pub use data_package::{DataPackageObject, GameData};
pub use hints::{Hint, HintCreationPolicy, HintStatus};
pub use items::{ClientStatus, ItemFlags, ItemsHandling, NetworkItem};
pub use message::JsonMessagePart;
pub use packets::{
	Bounce, Bounced, ClientPacket, Connect, Connected, PrintJson, RoomInfo, RoomUpdate,
	ServerPacket,
};
pub use players::{NetworkPlayer, NetworkSlot};
pub use version::NetworkVersion;
