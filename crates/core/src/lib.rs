//! ap: client core for Archipelago multiworld games.
//!
//! A game embeds one [`Client`]. It connects to a multiworld server, keeps
//! the connection alive with gated reconnection, scouts locations through a
//! cache, resolves ids to names, and forwards server events to handlers.
//!
//! Every operation is safe to call from a game loop while the server is
//! down: it answers with an empty or default value and logs a warning.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use ap::{Client, ClientConfig, ConnectionInfo, LocalDataPackage, StaticIntegration};
//!
//! #[tokio::main]
//! async fn main() {
//!     let integration = Arc::new(StaticIntegration::new("Celeste", "CelesteAP", "1.2.0"));
//!     let client = Client::websocket(integration, LocalDataPackage::new(), ClientConfig::default());
//!
//!     let result = client
//!         .connect(ConnectionInfo::new("archipelago.gg", 38281, "Madeline"))
//!         .await;
//!     println!("{result}");
//!
//!     let _items = client.on_item_received(|batch| async move {
//!         println!("received {} items", batch.items.len());
//!         Ok(())
//!     });
//!
//!     if let Some(scouted) = client.scout_one("Summit", true).await {
//!         println!("{scouted}");
//!     }
//! }
//! ```
//!
//! # Layout
//!
//! ```text
//! Client ──► ConnectionSupervisor ──► dyn Connector / dyn Session (ap-runtime)
//!   │               │
//!   │               └── pump ──► SignalHub ──► handlers
//!   ├── ScoutCache
//!   └── NameResolver ──► live RoomState, then LocalDataPackage
//! ```

mod client;
mod handlers;
mod signals;

pub mod config;
pub mod connection_info;
pub mod death_signal;
pub mod integration;
pub mod names;
pub mod result;
pub mod retry;
pub mod scout;
pub mod slot_data;
pub mod supervisor;
pub mod version;

pub use ap_protocol::{Hint, HintStatus, ItemFlags, NetworkItem, ServerPacket};
pub use ap_runtime::{Error, LogMessage, PlayerInfo, Result};
pub use client::{Client, ReceivedItem};
pub use config::ClientConfig;
pub use connection_info::ConnectionInfo;
pub use death_signal::DeathSignal;
pub use handlers::Subscription;
pub use integration::{GameIntegration, StaticIntegration};
pub use names::{LocalDataPackage, MISSING_ITEM_NAME, MISSING_LOCATION_NAME, NameResolver};
pub use result::ConnectionResult;
pub use scout::{ItemClassification, ScoutCache, ScoutedLocation};
pub use signals::{ItemBatch, SignalHub};
pub use slot_data::SlotData;
pub use supervisor::ConnectionSupervisor;
pub use version::{VersionMismatch, check_compatibility};
