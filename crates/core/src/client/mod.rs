//! [`Client`]: the public surface a game talks to.
//!
//! Every operation is safe to call from a game loop whether or not the
//! server is reachable. Operations that need the server go through
//! [`ConnectionSupervisor::ensure_usable`] and fall back to an empty or
//! default answer when it reports false.

mod events;
mod hints;
mod items;
mod locations;
mod names;
mod players;
mod scouting;

use std::sync::Arc;
use std::time::Duration;

use ap_runtime::{Connector, RoomHandle, Session, TransportConfig, WebSocketConnector};
use parking_lot::Mutex;

pub use self::items::ReceivedItem;
use crate::config::ClientConfig;
use crate::connection_info::ConnectionInfo;
use crate::integration::GameIntegration;
use crate::names::{LocalDataPackage, NameResolver};
use crate::result::ConnectionResult;
use crate::scout::ScoutCache;
use crate::signals::SignalHub;
use crate::slot_data::SlotData;
use crate::supervisor::ConnectionSupervisor;

/// Multiworld client for one game.
///
/// Cheap to clone; clones share the connection and caches.
#[derive(Clone)]
pub struct Client {
	shared: Arc<Shared>,
}

struct Shared {
	supervisor: ConnectionSupervisor,
	signals: Arc<SignalHub>,
	scouts: Mutex<ScoutCache>,
	/// Held across a scout round-trip so each location is asked about once.
	scout_gate: tokio::sync::Mutex<()>,
	names: NameResolver,
	integration: Arc<dyn GameIntegration>,
}

impl Client {
	/// Creates a client that opens sessions through `connector`.
	pub fn new(
		connector: Arc<dyn Connector>,
		integration: Arc<dyn GameIntegration>,
		local: LocalDataPackage,
	) -> Self {
		Self::with_config(connector, integration, local, ClientConfig::default())
	}

	pub fn with_config(
		connector: Arc<dyn Connector>,
		integration: Arc<dyn GameIntegration>,
		local: LocalDataPackage,
		config: ClientConfig,
	) -> Self {
		let signals = Arc::new(SignalHub::default());
		let supervisor = ConnectionSupervisor::new(
			connector,
			Arc::clone(&integration),
			config,
			Arc::clone(&signals),
		);
		Self {
			shared: Arc::new(Shared {
				supervisor,
				signals,
				scouts: Mutex::new(ScoutCache::new()),
				scout_gate: tokio::sync::Mutex::new(()),
				names: NameResolver::new(local),
				integration,
			}),
		}
	}

	/// Creates a client that connects over WebSocket.
	pub fn websocket(
		integration: Arc<dyn GameIntegration>,
		local: LocalDataPackage,
		config: ClientConfig,
	) -> Self {
		let transport = TransportConfig::default()
			.with_connect_timeout(config.connect_timeout)
			.with_request_timeout(config.request_timeout);
		let connector: Arc<dyn Connector> = Arc::new(WebSocketConnector::new(transport));
		Self::with_config(connector, integration, local, config)
	}

	pub fn supervisor(&self) -> &ConnectionSupervisor {
		&self.shared.supervisor
	}

	pub fn config(&self) -> &ClientConfig {
		self.shared.supervisor.config()
	}

	/// Game this client plays, as registered with the server.
	pub fn game_name(&self) -> &str {
		self.shared.integration.game_name()
	}

	/// Connects to a multiworld, replacing any previous connection.
	pub async fn connect(&self, info: ConnectionInfo) -> ConnectionResult {
		self.shared.supervisor.connect(info).await
	}

	pub fn is_connected(&self) -> bool {
		self.shared.supervisor.is_connected()
	}

	/// [`ConnectionSupervisor::ensure_usable`] with the configured retry threshold.
	pub async fn ensure_usable(&self) -> bool {
		let cooldown = self.config().retry_threshold;
		self.shared.supervisor.ensure_usable(cooldown).await
	}

	pub async fn ensure_usable_within(&self, cooldown: Duration) -> bool {
		self.shared.supervisor.ensure_usable(cooldown).await
	}

	/// Per-frame poll. Reconnects at most once per update threshold.
	pub async fn update(&self) -> bool {
		self.shared.supervisor.update().await
	}

	pub fn disconnect_and_cleanup(&self) {
		self.shared.supervisor.disconnect_and_cleanup();
	}

	pub fn disconnect_temporarily(&self) {
		self.shared.supervisor.disconnect_temporarily();
	}

	pub async fn reconnect_after_temporary_disconnect(&self) -> bool {
		self.shared.supervisor.reconnect_after_temporary_disconnect().await
	}

	pub fn disconnect_permanently(&self) {
		self.shared.supervisor.disconnect_permanently();
	}

	pub fn slot_data(&self) -> Option<SlotData> {
		self.shared.supervisor.slot_data()
	}

	pub fn connection_info(&self) -> Option<ConnectionInfo> {
		self.shared.supervisor.connection_info()
	}

	/// Whether incoming deaths reach the game.
	pub fn death_link_enabled(&self) -> bool {
		self.shared.signals.death_link().is_enabled()
	}

	/// Usable session, reconnecting if the backoff allows it.
	async fn usable_session(&self) -> Option<Arc<dyn Session>> {
		if !self.ensure_usable().await {
			return None;
		}
		self.shared.supervisor.session()
	}

	async fn usable_room(&self) -> Option<RoomHandle> {
		self.usable_session().await.map(|session| session.room())
	}

	/// Room of the live session. Never reconnects.
	fn live_room(&self) -> Option<RoomHandle> {
		self.shared.supervisor.room()
	}
}

impl std::fmt::Debug for Client {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Client")
			.field("game", &self.game_name())
			.field("connected", &self.is_connected())
			.finish()
	}
}
