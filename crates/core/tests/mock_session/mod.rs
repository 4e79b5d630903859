//! In-memory connector and session for driving the client without a server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ap::{GameIntegration, StaticIntegration};
use ap_protocol::{ClientPacket, GameData, Hint, HintCreationPolicy, ItemFlags, NetworkItem};
use ap_runtime::{
	BoxFuture, Connector, Error, LoginRequest, LoginResult, Result, RoomHandle, RoomState, Session,
	SessionEvent,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;

pub const GAME: &str = "Stardew Valley";
pub const OTHER_GAME: &str = "Hollow Knight";
pub const MOD_NAME: &str = "StardewArchipelago";
pub const MOD_VERSION: &str = "6.2.1";

/// Installs a test log subscriber once. Honours `RUST_LOG`.
pub fn init_tracing() {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_test_writer()
		.compact()
		.try_init();
}

pub fn integration() -> Arc<dyn GameIntegration> {
	Arc::new(StaticIntegration::new(GAME, MOD_NAME, MOD_VERSION))
}

/// Slot data accepted by [`integration`].
pub fn slot_data(version: &str, death_link: bool) -> Map<String, Value> {
	json!({
		"multiworld_version": version,
		"death_link": death_link,
		"farm_type": 3,
	})
	.as_object()
	.cloned()
	.unwrap_or_default()
}

/// A room with two players: Farmer (slot 1, us) and Knight (slot 2).
pub fn room() -> RoomState {
	let mut room = RoomState::new();
	room.set_identity(0, 1);
	room.insert_player(0, 1, "Farmer", GAME);
	room.insert_player(0, 2, "Knight", OTHER_GAME);
	room.insert_game_data(
		GAME,
		&GameData {
			item_name_to_id: [("Hoe".to_string(), 1), ("Pickaxe".to_string(), 2)]
				.into_iter()
				.collect(),
			location_name_to_id: [
				("Farm Cave".to_string(), 10),
				("Mines Floor 5".to_string(), 11),
				("Mines Floor 10".to_string(), 12),
				("Community Center".to_string(), 13),
			]
			.into_iter()
			.collect(),
			..GameData::default()
		},
	);
	room.insert_game_data(
		OTHER_GAME,
		&GameData {
			item_name_to_id: [("Mothwing Cloak".to_string(), 500)].into_iter().collect(),
			location_name_to_id: [("King's Pass".to_string(), 900)].into_iter().collect(),
			..GameData::default()
		},
	);
	room.mark_missing([10, 11, 12]);
	room.mark_checked([13]);
	room
}

#[derive(Debug, Clone)]
pub enum Login {
	Accept(Map<String, Value>),
	/// Refused with these server error codes.
	Reject(Vec<String>),
	/// The socket cannot be opened.
	Unreachable,
}

pub struct MockConnector {
	login: Mutex<Login>,
	room: Mutex<RoomState>,
	placements: Mutex<HashMap<i64, NetworkItem>>,
	hints: Mutex<Vec<Hint>>,
	attempts: AtomicUsize,
	sessions: Mutex<Vec<Arc<MockSession>>>,
}

impl MockConnector {
	pub fn new(login: Login) -> Arc<Self> {
		let connector = Arc::new(Self {
			login: Mutex::new(login),
			room: Mutex::new(room()),
			placements: Mutex::new(HashMap::new()),
			hints: Mutex::new(Vec::new()),
			attempts: AtomicUsize::new(0),
			sessions: Mutex::new(Vec::new()),
		});
		connector.place(10, 2, 1, ItemFlags::NEVER_EXCLUDE);
		connector.place(11, 500, 2, ItemFlags::ADVANCEMENT);
		connector.place(12, 1, 1, ItemFlags::NONE);
		connector
	}

	/// Accepting connector with a compatible version and death link off.
	pub fn accepting() -> Arc<Self> {
		Self::new(Login::Accept(slot_data(MOD_VERSION, false)))
	}

	pub fn set_login(&self, login: Login) {
		*self.login.lock() = login;
	}

	/// Puts item `item` of `player` at `location`.
	pub fn place(&self, location: i64, item: i64, player: i64, flags: ItemFlags) {
		self.placements.lock().insert(
			location,
			NetworkItem {
				item,
				location,
				player,
				flags,
			},
		);
	}

	pub fn set_hints(&self, hints: Vec<Hint>) {
		*self.hints.lock() = hints;
	}

	/// Number of `create_session` calls so far.
	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::SeqCst)
	}

	pub fn sessions(&self) -> Vec<Arc<MockSession>> {
		self.sessions.lock().clone()
	}

	pub fn last_session(&self) -> Arc<MockSession> {
		self.sessions
			.lock()
			.last()
			.cloned()
			.expect("no session was opened")
	}

	/// Total scout requests across all sessions.
	pub fn scout_requests(&self) -> usize {
		self.sessions
			.lock()
			.iter()
			.map(|session| session.scout_requests().len())
			.sum()
	}
}

impl Connector for MockConnector {
	fn create_session(&self, host: &str, port: u16) -> BoxFuture<'_, Result<Arc<dyn Session>>> {
		self.attempts.fetch_add(1, Ordering::SeqCst);
		let address = format!("{host}:{port}");
		Box::pin(async move {
			let login = self.login.lock().clone();
			if let Login::Unreachable = login {
				return Err(Error::ConnectionFailed {
					address,
					reason: "connection refused".into(),
				});
			}
			let session = Arc::new(MockSession::new(
				self.room.lock().clone(),
				login,
				self.placements.lock().clone(),
				self.hints.lock().clone(),
			));
			self.sessions.lock().push(Arc::clone(&session));
			Ok(session as Arc<dyn Session>)
		})
	}
}

pub struct MockSession {
	room: RoomHandle,
	login: Login,
	placements: HashMap<i64, NetworkItem>,
	hints: Vec<Hint>,
	logins: Mutex<Vec<LoginRequest>>,
	sent: Mutex<Vec<ClientPacket>>,
	scouts: Mutex<Vec<(HintCreationPolicy, Vec<i64>)>>,
	event_tx: Mutex<Option<mpsc::UnboundedSender<SessionEvent>>>,
	event_rx: Mutex<Option<mpsc::UnboundedReceiver<SessionEvent>>>,
	disconnected: AtomicBool,
}

impl MockSession {
	fn new(
		room: RoomState,
		login: Login,
		placements: HashMap<i64, NetworkItem>,
		hints: Vec<Hint>,
	) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			room: room.into_handle(),
			login,
			placements,
			hints,
			logins: Mutex::new(Vec::new()),
			sent: Mutex::new(Vec::new()),
			scouts: Mutex::new(Vec::new()),
			event_tx: Mutex::new(Some(tx)),
			event_rx: Mutex::new(Some(rx)),
			disconnected: AtomicBool::new(false),
		}
	}

	/// Pushes an event as if the server produced it. Returns false once closed.
	pub fn emit(&self, event: SessionEvent) -> bool {
		match self.event_tx.lock().as_ref() {
			Some(tx) => tx.send(event).is_ok(),
			None => false,
		}
	}

	pub fn sent(&self) -> Vec<ClientPacket> {
		self.sent.lock().clone()
	}

	pub fn logins(&self) -> Vec<LoginRequest> {
		self.logins.lock().clone()
	}

	pub fn scout_requests(&self) -> Vec<(HintCreationPolicy, Vec<i64>)> {
		self.scouts.lock().clone()
	}

	pub fn is_disconnected(&self) -> bool {
		self.disconnected.load(Ordering::SeqCst)
	}
}

impl Session for MockSession {
	fn login(&self, request: LoginRequest) -> BoxFuture<'_, Result<LoginResult>> {
		Box::pin(async move {
			self.room.write().set_tags(request.tags.clone());
			self.logins.lock().push(request);
			Ok(match &self.login {
				Login::Accept(slot_data) => {
					let room = self.room.read();
					LoginResult::Success {
						team: room.team(),
						slot: room.slot(),
						slot_data: slot_data.clone(),
					}
				}
				Login::Reject(codes) => LoginResult::refused(codes.clone()),
				Login::Unreachable => LoginResult::refused(vec!["unreachable".into()]),
			})
		})
	}

	fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
		self.event_rx.lock().take()
	}

	fn unsubscribe(&self) {
		self.event_tx.lock().take();
		self.event_rx.lock().take();
	}

	fn send_packet(&self, packet: ClientPacket) -> Result<()> {
		if self.is_disconnected() {
			return Err(Error::NotConnected);
		}
		self.sent.lock().push(packet);
		Ok(())
	}

	fn scout_locations(
		&self,
		policy: HintCreationPolicy,
		locations: Vec<i64>,
	) -> BoxFuture<'_, Result<Vec<NetworkItem>>> {
		Box::pin(async move {
			if self.is_disconnected() {
				return Err(Error::NotConnected);
			}
			self.scouts.lock().push((policy, locations.clone()));
			// Give concurrent callers a chance to run before the answer arrives.
			tokio::task::yield_now().await;
			let answer = locations
				.iter()
				.filter_map(|id| self.placements.get(id).cloned())
				.collect();
			Ok(answer)
		})
	}

	fn hints(&self) -> BoxFuture<'_, Result<Vec<Hint>>> {
		Box::pin(async move { Ok(self.hints.clone()) })
	}

	fn disconnect(&self) -> BoxFuture<'_, ()> {
		Box::pin(async move {
			self.disconnected.store(true, Ordering::SeqCst);
			self.event_tx.lock().take();
		})
	}

	fn room(&self) -> RoomHandle {
		Arc::clone(&self.room)
	}
}

impl MockConnector {
	/// Removes whatever sits at `location`, so scouts of it come back short.
	pub fn clear_placement(&self, location: i64) {
		self.placements.lock().remove(&location);
	}
}

/// Integration that records hook calls.
pub struct RecordingIntegration {
	identity: StaticIntegration,
	pub errors: Mutex<Vec<String>>,
	pub reconnect_successes: AtomicUsize,
	pub reconnect_failures: AtomicUsize,
}

impl RecordingIntegration {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			identity: StaticIntegration::new(GAME, MOD_NAME, MOD_VERSION),
			errors: Mutex::new(Vec::new()),
			reconnect_successes: AtomicUsize::new(0),
			reconnect_failures: AtomicUsize::new(0),
		})
	}
}

impl GameIntegration for RecordingIntegration {
	fn game_name(&self) -> &str {
		self.identity.game_name()
	}

	fn mod_name(&self) -> &str {
		self.identity.mod_name()
	}

	fn mod_version(&self) -> &str {
		self.identity.mod_version()
	}

	fn on_error(&self, message: &str) {
		self.errors.lock().push(message.to_string());
	}

	fn on_reconnect_success(&self) {
		self.reconnect_successes.fetch_add(1, Ordering::SeqCst);
	}

	fn on_reconnect_failure(&self) {
		self.reconnect_failures.fetch_add(1, Ordering::SeqCst);
	}
}

pub fn client_with(connector: &Arc<MockConnector>, integration: Arc<dyn GameIntegration>) -> ap::Client {
	let connector: Arc<dyn Connector> = Arc::clone(connector) as Arc<dyn Connector>;
	ap::Client::new(connector, integration, ap::LocalDataPackage::new())
}

pub fn client(connector: &Arc<MockConnector>) -> ap::Client {
	client_with(connector, integration())
}

pub fn info() -> ap::ConnectionInfo {
	ap::ConnectionInfo::new("localhost", 38281, "Farmer")
}

/// Yields until `condition` holds. Does not advance paused time.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
	for _ in 0..200 {
		if condition() {
			return;
		}
		tokio::task::yield_now().await;
	}
	panic!("condition was not reached");
}
