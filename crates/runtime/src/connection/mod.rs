//! WebSocket implementation of the session capability surface.
//!
//! # Message flow
//!
//! 1. [`WebSocketConnector::create_session`] opens the socket and waits for `RoomInfo`
//! 2. [`Session::login`] fetches the data package for the room's games, then sends `Connect`
//! 3. The reader task folds every packet into the [`RoomState`] and resolves pending waiters
//! 4. Everything is also pushed, in arrival order, onto the session's event queue
//!
//! Scout replies carry no request id, so pending scouts are answered first in,
//! first out, and an `InvalidPacket` for `LocationScouts` fails the oldest
//! one. `Get` replies are matched by key.
//!
//! [`RoomState`]: crate::room::RoomState

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ap_protocol::{ClientPacket, Connected, Hint, HintCreationPolicy, NetworkItem, ServerPacket};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Notify, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::room::{RoomHandle, RoomState};
use crate::session::{
	BoxFuture, Connector, LogMessage, LoginRequest, LoginResult, Session, SessionEvent,
};
use crate::transport::{self, Inbound, TransportReceiver, TransportSender};

/// Timeouts applied by the WebSocket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
	/// Bound on opening the socket, receiving `RoomInfo`, and the login reply.
	pub connect_timeout: Duration,
	/// Bound on data package, scout and `Get` replies.
	pub request_timeout: Duration,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			connect_timeout: Duration::from_secs(30),
			request_timeout: Duration::from_secs(10),
		}
	}
}

impl TransportConfig {
	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}
}

/// Opens [`WebSocketSession`]s.
#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector {
	config: TransportConfig,
}

impl WebSocketConnector {
	pub fn new(config: TransportConfig) -> Self {
		Self { config }
	}
}

impl Connector for WebSocketConnector {
	fn create_session(&self, host: &str, port: u16) -> BoxFuture<'_, Result<Arc<dyn Session>>> {
		let host = host.to_string();
		Box::pin(async move {
			let stream = transport::connect(&host, port, self.config.connect_timeout).await?;
			let session = WebSocketSession::start(stream, self.config);
			session.wait_for_room_info().await?;
			Ok(session as Arc<dyn Session>)
		})
	}
}

/// Reply to a pending `Connect`.
enum LoginReply {
	Connected(Box<Connected>),
	Refused(Vec<String>),
}

/// Requests waiting for a server reply.
#[derive(Default)]
struct Waiters {
	login: Option<oneshot::Sender<LoginReply>>,
	data_package: Option<oneshot::Sender<()>>,
	scouts: VecDeque<oneshot::Sender<Result<Vec<NetworkItem>>>>,
}

enum Outbound {
	Packets(Vec<ClientPacket>),
	Close,
}

/// State shared between the session handle and its reader/writer tasks.
struct Inner {
	config: TransportConfig,
	outbound_tx: mpsc::UnboundedSender<Outbound>,
	room: RoomHandle,
	room_ready: Notify,
	waiters: Mutex<Waiters>,
	/// Pending `Get` requests keyed by data storage key.
	retrieved: DashMap<String, oneshot::Sender<Value>>,
	event_tx: Mutex<Option<mpsc::UnboundedSender<SessionEvent>>>,
	event_rx: Mutex<Option<mpsc::UnboundedReceiver<SessionEvent>>>,
	closed: AtomicBool,
}

impl Inner {
	fn new(config: TransportConfig, outbound_tx: mpsc::UnboundedSender<Outbound>) -> Self {
		let (event_tx, event_rx) = mpsc::unbounded_channel();
		Self {
			config,
			outbound_tx,
			room: RoomState::new().into_handle(),
			room_ready: Notify::new(),
			waiters: Mutex::new(Waiters::default()),
			retrieved: DashMap::new(),
			event_tx: Mutex::new(Some(event_tx)),
			event_rx: Mutex::new(Some(event_rx)),
			closed: AtomicBool::new(false),
		}
	}

	fn emit(&self, event: SessionEvent) {
		if let Some(tx) = self.event_tx.lock().as_ref() {
			let _ = tx.send(event);
		}
	}

	fn send(&self, packets: Vec<ClientPacket>) -> Result<()> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(Error::NotConnected);
		}
		self.outbound_tx
			.send(Outbound::Packets(packets))
			.map_err(|_| Error::ChannelClosed)
	}

	/// Drops every waiter so pending requests fail with `ChannelClosed`.
	fn abandon_waiters(&self) {
		*self.waiters.lock() = Waiters::default();
		self.retrieved.clear();
	}

	/// Marks the session dead after a socket fault and reports it once.
	fn fail(&self, event: SessionEvent) {
		if self.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		warn!(target = "ap.transport", ?event, "Session lost");
		self.abandon_waiters();
		self.emit(event);
	}

	/// Applies one inbound packet.
	fn dispatch(&self, packet: ServerPacket) {
		debug!(target = "ap.transport", cmd = packet.command(), "Received packet");
		self.room.write().apply(&packet);
		self.emit(SessionEvent::Packet(packet.clone()));

		match packet {
			ServerPacket::RoomInfo(_) => self.room_ready.notify_one(),
			ServerPacket::Connected(connected) => {
				if let Some(tx) = self.waiters.lock().login.take() {
					let _ = tx.send(LoginReply::Connected(Box::new(connected)));
				}
			}
			ServerPacket::ConnectionRefused { errors } => {
				if let Some(tx) = self.waiters.lock().login.take() {
					let _ = tx.send(LoginReply::Refused(errors));
				}
			}
			ServerPacket::ReceivedItems { index, items } => {
				self.emit(SessionEvent::ItemsReceived { index, items });
			}
			ServerPacket::LocationInfo { locations } => {
				match self.waiters.lock().scouts.pop_front() {
					Some(tx) => {
						let _ = tx.send(Ok(locations));
					}
					None => debug!(target = "ap.transport", "LocationInfo with no pending scout"),
				}
			}
			ServerPacket::PrintJson(message) => {
				let text = self.room.read().render_message(&message);
				self.emit(SessionEvent::Message(LogMessage {
					kind: message.kind,
					text,
				}));
			}
			ServerPacket::DataPackage { .. } => {
				if let Some(tx) = self.waiters.lock().data_package.take() {
					let _ = tx.send(());
				}
			}
			ServerPacket::Bounced(bounced) => self.emit(SessionEvent::Bounced(bounced)),
			ServerPacket::Retrieved { keys } => {
				for (key, value) in keys {
					if let Some((_, tx)) = self.retrieved.remove(&key) {
						let _ = tx.send(value);
					}
				}
			}
			ServerPacket::InvalidPacket {
				kind,
				original_cmd,
				text,
			} => {
				warn!(
					target = "ap.transport",
					%kind,
					original_cmd = original_cmd.as_deref().unwrap_or("<none>"),
					%text,
					"Server rejected a packet"
				);
				// A rejected scout gets no LocationInfo.
				if original_cmd.as_deref() == Some("LocationScouts") {
					if let Some(tx) = self.waiters.lock().scouts.pop_front() {
						let _ = tx.send(Err(Error::Protocol(format!("LocationScouts rejected: {text}"))));
					}
				}
			}
			_ => {}
		}
	}
}

/// Removes a pending `Get` entry if the request future is dropped early.
struct PendingGet<'a> {
	key: String,
	pending: &'a DashMap<String, oneshot::Sender<Value>>,
}

impl Drop for PendingGet<'_> {
	fn drop(&mut self) {
		if self.pending.remove(&self.key).is_some() {
			debug!(target = "ap.transport", key = %self.key, "Removed orphaned Get request");
		}
	}
}

/// A logged-in (or logging-in) WebSocket connection.
pub struct WebSocketSession {
	inner: Arc<Inner>,
	tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WebSocketSession {
	/// Starts the reader and writer tasks over an open WebSocket.
	pub fn start<S>(stream: WebSocketStream<S>, config: TransportConfig) -> Arc<Self>
	where
		S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
	{
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		let inner = Arc::new(Inner::new(config, outbound_tx));
		let (sender, receiver) = transport::split(stream);

		let reader = tokio::spawn(read_loop(Arc::clone(&inner), receiver));
		let writer = tokio::spawn(write_loop(Arc::clone(&inner), sender, outbound_rx));

		Arc::new(Self {
			inner,
			tasks: Mutex::new(vec![reader, writer]),
		})
	}

	/// Waits until the server has sent `RoomInfo`.
	pub async fn wait_for_room_info(&self) -> Result<()> {
		tokio::time::timeout(self.inner.config.connect_timeout, self.inner.room_ready.notified())
			.await
			.map_err(|_| Error::Timeout("server did not send RoomInfo".to_string()))
	}

	async fn login_inner(&self, request: LoginRequest) -> Result<LoginResult> {
		let inner = &self.inner;
		let games = inner.room.read().games().to_vec();

		if !games.is_empty() {
			let (tx, rx) = oneshot::channel();
			inner.waiters.lock().data_package = Some(tx);
			inner.send(vec![ClientPacket::GetDataPackage { games: Some(games) }])?;
			match tokio::time::timeout(inner.config.request_timeout, rx).await {
				Ok(Ok(())) => {}
				Ok(Err(_)) => return Err(Error::ChannelClosed),
				Err(_) => {
					warn!(target = "ap.transport", "Data package request timed out, continuing without names");
				}
			}
		}

		inner.room.write().set_tags(request.tags.clone());
		let (tx, rx) = oneshot::channel();
		inner.waiters.lock().login = Some(tx);
		inner.send(vec![request.to_packet()])?;

		let reply = tokio::time::timeout(inner.config.connect_timeout, rx)
			.await
			.map_err(|_| Error::Timeout(format!("no reply to Connect for slot {}", request.slot_name)))?
			.map_err(|_| Error::ChannelClosed)?;

		Ok(match reply {
			LoginReply::Connected(connected) => LoginResult::Success {
				team: connected.team,
				slot: connected.slot,
				slot_data: match connected.slot_data {
					Value::Object(map) => map,
					_ => Map::new(),
				},
			},
			LoginReply::Refused(codes) => LoginResult::refused(codes),
		})
	}

	async fn scout_inner(
		&self,
		policy: HintCreationPolicy,
		locations: Vec<i64>,
	) -> Result<Vec<NetworkItem>> {
		if locations.is_empty() {
			return Ok(Vec::new());
		}
		let inner = &self.inner;
		let rx = {
			let mut waiters = inner.waiters.lock();
			let (tx, rx) = oneshot::channel();
			waiters.scouts.push_back(tx);
			if let Err(e) = inner.send(vec![ClientPacket::LocationScouts {
				locations,
				create_as_hint: policy,
			}]) {
				waiters.scouts.pop_back();
				return Err(e);
			}
			rx
		};

		tokio::time::timeout(inner.config.request_timeout, rx)
			.await
			.map_err(|_| Error::Timeout("no reply to LocationScouts".to_string()))?
			.map_err(|_| Error::ChannelClosed)?
	}

	async fn hints_inner(&self) -> Result<Vec<Hint>> {
		let inner = &self.inner;
		let key = {
			let room = inner.room.read();
			format!("_read_hints_{}_{}", room.team(), room.slot())
		};

		let (tx, rx) = oneshot::channel();
		inner.retrieved.insert(key.clone(), tx);
		let _guard = PendingGet {
			key: key.clone(),
			pending: &inner.retrieved,
		};
		inner.send(vec![ClientPacket::Get { keys: vec![key] }])?;

		let value = tokio::time::timeout(inner.config.request_timeout, rx)
			.await
			.map_err(|_| Error::Timeout("no reply to Get".to_string()))?
			.map_err(|_| Error::ChannelClosed)?;

		if value.is_null() {
			return Ok(Vec::new());
		}
		Ok(serde_json::from_value(value)?)
	}
}

impl Session for WebSocketSession {
	fn login(&self, request: LoginRequest) -> BoxFuture<'_, Result<LoginResult>> {
		Box::pin(self.login_inner(request))
	}

	fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
		self.inner.event_rx.lock().take()
	}

	fn unsubscribe(&self) {
		self.inner.event_tx.lock().take();
		self.inner.event_rx.lock().take();
	}

	fn send_packet(&self, packet: ClientPacket) -> Result<()> {
		if let ClientPacket::ConnectUpdate {
			tags: Some(tags), ..
		} = &packet
		{
			self.inner.room.write().set_tags(tags.clone());
		}
		self.inner.send(vec![packet])
	}

	fn scout_locations(
		&self,
		policy: HintCreationPolicy,
		locations: Vec<i64>,
	) -> BoxFuture<'_, Result<Vec<NetworkItem>>> {
		Box::pin(self.scout_inner(policy, locations))
	}

	fn hints(&self) -> BoxFuture<'_, Result<Vec<Hint>>> {
		Box::pin(self.hints_inner())
	}

	fn disconnect(&self) -> BoxFuture<'_, ()> {
		Box::pin(async move {
			if self.inner.closed.swap(true, Ordering::SeqCst) {
				return;
			}
			debug!(target = "ap.transport", "Closing session");
			self.inner.abandon_waiters();
			let _ = self.inner.outbound_tx.send(Outbound::Close);
		})
	}

	fn room(&self) -> RoomHandle {
		Arc::clone(&self.inner.room)
	}
}

impl Drop for WebSocketSession {
	fn drop(&mut self) {
		for task in self.tasks.lock().drain(..) {
			task.abort();
		}
	}
}

async fn read_loop<S>(inner: Arc<Inner>, mut receiver: TransportReceiver<S>)
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	loop {
		match receiver.recv().await {
			Ok(Inbound::Packets(packets)) => {
				for packet in packets {
					inner.dispatch(packet);
				}
			}
			Ok(Inbound::Closed(reason)) => {
				inner.fail(SessionEvent::SocketClosed(reason));
				break;
			}
			Err(e) => {
				inner.fail(SessionEvent::SocketError(e.to_string()));
				break;
			}
		}
	}
}

async fn write_loop<S>(
	inner: Arc<Inner>,
	mut sender: TransportSender<S>,
	mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
) where
	S: AsyncRead + AsyncWrite + Unpin,
{
	while let Some(outbound) = outbound_rx.recv().await {
		match outbound {
			Outbound::Packets(packets) => {
				if let Err(e) = sender.send(&packets).await {
					inner.fail(SessionEvent::SocketError(e.to_string()));
					break;
				}
			}
			Outbound::Close => {
				sender.close().await;
				break;
			}
		}
	}
}
