//! Connection lifecycle.
//!
//! The supervisor owns the stored [`ConnectionInfo`], the live session and
//! the reconnection backoff. Everything else in the crate asks it for a usable
//! session through [`ConnectionSupervisor::ensure_usable`], which either
//! answers from state or makes one gated reconnection attempt.
//!
//! ```text
//!   connect(info) ──► attempt ──► login ──► version check ──► Live
//!                        ▲                                     │
//!   ensure_usable ───────┘ (cooldown, retries allowed)         │ fault
//!                                                              ▼
//!                                   disconnect_and_cleanup ◄── pump
//! ```

mod pump;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ap_runtime::{Connector, LoginRequest, LoginResult, RoomHandle, Session, SessionEvent};
use parking_lot::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::connection_info::ConnectionInfo;
use crate::death_signal::{DEATH_LINK_TAG, set_session_tag};
use crate::integration::GameIntegration;
use crate::result::ConnectionResult;
use crate::retry::RetryState;
use crate::signals::SignalHub;
use crate::slot_data::SlotData;
use crate::version::check_compatibility;

/// Why a connection attempt is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptKind {
	/// Caller-initiated. Failures clear the stored info.
	Explicit,
	/// Made by `ensure_usable`. Login failures keep the stored info.
	Reconnect,
}

struct LiveSession {
	session: Arc<dyn Session>,
	generation: u64,
}

struct LinkState {
	info: Option<ConnectionInfo>,
	live: Option<LiveSession>,
	slot_data: Option<SlotData>,
	retry: RetryState,
}

pub(crate) struct SupervisorInner {
	connector: Arc<dyn Connector>,
	integration: Arc<dyn GameIntegration>,
	config: ClientConfig,
	signals: Arc<SignalHub>,
	state: Mutex<LinkState>,
	/// Serializes connection attempts.
	attempt: tokio::sync::Mutex<()>,
	/// Bumped whenever a live session ends. Pumps of older sessions stop.
	generation: AtomicU64,
	uuid: String,
}

/// Owns the connection and decides when to reconnect.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ConnectionSupervisor {
	inner: Arc<SupervisorInner>,
}

impl ConnectionSupervisor {
	pub fn new(
		connector: Arc<dyn Connector>,
		integration: Arc<dyn GameIntegration>,
		config: ClientConfig,
		signals: Arc<SignalHub>,
	) -> Self {
		let retry = RetryState::new(config.retry_threshold);
		Self {
			inner: Arc::new(SupervisorInner {
				connector,
				integration,
				config,
				signals,
				state: Mutex::new(LinkState {
					info: None,
					live: None,
					slot_data: None,
					retry,
				}),
				attempt: tokio::sync::Mutex::new(()),
				generation: AtomicU64::new(0),
				uuid: uuid::Uuid::new_v4().to_string(),
			}),
		}
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	pub fn integration(&self) -> &Arc<dyn GameIntegration> {
		&self.inner.integration
	}

	pub fn is_connected(&self) -> bool {
		self.inner.state.lock().live.is_some()
	}

	/// Live session, if connected.
	pub fn session(&self) -> Option<Arc<dyn Session>> {
		self.inner
			.state
			.lock()
			.live
			.as_ref()
			.map(|live| Arc::clone(&live.session))
	}

	/// Room of the live session, if connected.
	pub fn room(&self) -> Option<RoomHandle> {
		self.session().map(|session| session.room())
	}

	/// Slot data of the last successful login.
	pub fn slot_data(&self) -> Option<SlotData> {
		self.inner.state.lock().slot_data.clone()
	}

	/// Stored connection parameters. `None` once permanently disconnected.
	pub fn connection_info(&self) -> Option<ConnectionInfo> {
		self.inner.state.lock().info.clone()
	}

	/// Records the death-signal preference for future logins.
	pub fn set_death_link(&self, enabled: bool) {
		if let Some(info) = self.inner.state.lock().info.as_mut() {
			info.death_link = Some(enabled);
		}
	}

	/// Connects with `info`, bypassing the backoff.
	pub async fn connect(&self, info: ConnectionInfo) -> ConnectionResult {
		let _gate = self.inner.attempt.lock().await;
		self.disconnect_permanently();
		self.attempt(info, AttemptKind::Explicit).await
	}

	/// Returns true if a session is usable, reconnecting if allowed.
	///
	/// No I/O happens when connected, when never configured, or while less
	/// than `cooldown` has passed since the last failure.
	pub async fn ensure_usable(&self, cooldown: Duration) -> bool {
		if self.is_connected() {
			return true;
		}

		let _gate = self.inner.attempt.lock().await;
		let info = {
			let mut state = self.inner.state.lock();
			if state.live.is_some() {
				return true;
			}
			let Some(info) = state.info.clone() else {
				return false;
			};
			if state.retry.is_cooling_down(cooldown) {
				return false;
			}
			if !state.retry.allows_retries() {
				error!(target = "ap.session", "Reconnection attempt failed: retries are suspended");
				state.retry.record_failure();
				return false;
			}
			info
		};

		info!(target = "ap.session", address = %info.address(), "Attempting to reconnect");
		let result = self.attempt(info, AttemptKind::Reconnect).await;
		if result.is_success() {
			self.inner.integration.on_reconnect_success();
			true
		} else {
			self.inner.state.lock().retry.record_failure();
			self.inner.integration.on_reconnect_failure();
			false
		}
	}

	/// The per-frame poll: reconnects at most once per update threshold.
	pub async fn update(&self) -> bool {
		self.ensure_usable(self.inner.config.update_threshold).await
	}

	/// Ends the live session. Stored info is kept, so later calls may reconnect.
	pub fn disconnect_and_cleanup(&self) {
		self.inner.end_live_session(None);
	}

	/// Ends the live session and suspends automatic reconnection.
	pub fn disconnect_temporarily(&self) {
		self.disconnect_and_cleanup();
		self.inner.state.lock().retry.suspend();
	}

	/// Resumes automatic reconnection and tries immediately.
	pub async fn reconnect_after_temporary_disconnect(&self) -> bool {
		self.inner.state.lock().retry.resume();
		self.ensure_usable(Duration::ZERO).await
	}

	/// Ends the live session and forgets the stored info.
	pub fn disconnect_permanently(&self) {
		self.disconnect_and_cleanup();
		self.inner.state.lock().info = None;
	}

	async fn attempt(&self, mut info: ConnectionInfo, kind: AttemptKind) -> ConnectionResult {
		self.disconnect_and_cleanup();
		self.inner.state.lock().info = Some(info.clone());

		let config = &self.inner.config;
		let integration = &self.inner.integration;

		let mut tags = config.base_tags.clone();
		if info.death_link == Some(true) {
			tags.push(DEATH_LINK_TAG.to_string());
		}
		let request = LoginRequest {
			game: integration.game_name().to_string(),
			slot_name: info.slot_name.clone(),
			password: info.password.clone(),
			items_handling: config.items_handling,
			version: config.client_version,
			tags,
			uuid: self.inner.uuid.clone(),
		};

		let session = match timeout(
			config.connect_timeout,
			self.inner.connector.create_session(&info.host, info.port),
		)
		.await
		{
			Ok(Ok(session)) => session,
			Ok(Err(e)) => return self.login_failed(&info, vec![e.to_string()], Vec::new(), kind),
			Err(_) => {
				let reason = format!("Timed out after {:?}", config.connect_timeout);
				return self.login_failed(&info, vec![reason], Vec::new(), kind);
			}
		};

		let login = match timeout(config.connect_timeout, session.login(request)).await {
			Ok(Ok(login)) => login,
			Ok(Err(e)) => LoginResult::Failure {
				errors: vec![e.to_string()],
				error_codes: Vec::new(),
			},
			Err(_) => LoginResult::Failure {
				errors: vec![format!("Timed out after {:?}", config.connect_timeout)],
				error_codes: Vec::new(),
			},
		};

		let (team, slot, fields) = match login {
			LoginResult::Success {
				team,
				slot,
				slot_data,
			} => (team, slot, slot_data),
			LoginResult::Failure {
				errors,
				error_codes,
			} => {
				spawn_disconnect(session);
				return self.login_failed(&info, errors, error_codes, kind);
			}
		};

		info!(
			target = "ap.session",
			"Connected to Archipelago server as {} (Team {team}).",
			info.slot_name
		);

		let slot_data = integration.parse_slot_data(&info.slot_name, &fields);
		let death_link = *info.death_link.get_or_insert(slot_data.death_link);

		if let Err(mismatch) = check_compatibility(integration.mod_version(), &slot_data.multiworld_version)
		{
			let result = mismatch.into_result(
				integration.mod_name(),
				integration.mod_version(),
				&slot_data.multiworld_version,
			);
			error!(target = "ap.session", %result, "Incompatible multiworld");
			spawn_disconnect(session);
			self.inner.state.lock().info = None;
			return result;
		}

		let events = session.subscribe();
		let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
		{
			let mut state = self.inner.state.lock();
			state.info = Some(info.clone());
			state.slot_data = Some(slot_data);
			state.live = Some(LiveSession {
				session: Arc::clone(&session),
				generation,
			});
		}
		debug!(target = "ap.session", team, slot, generation, "Session is live");

		match events {
			Some(events) => {
				tokio::spawn(pump::run(Arc::downgrade(&self.inner), events, generation));
			}
			None => warn!(target = "ap.session", "Session events were already taken"),
		}

		self.inner.signals.death_link().set_enabled(death_link);
		if let Err(e) = set_session_tag(session.as_ref(), DEATH_LINK_TAG, death_link) {
			warn!(target = "ap.session", error = %e, "Failed to update death link tag");
		}

		ConnectionResult::Success {
			message: format!(
				"Connected to Archipelago server as {} (Team {team}).",
				info.slot_name
			),
		}
	}

	fn login_failed(
		&self,
		info: &ConnectionInfo,
		errors: Vec<String>,
		error_codes: Vec<String>,
		kind: AttemptKind,
	) -> ConnectionResult {
		let mut message = format!("Failed to Connect to {} as {}:", info.address(), info.slot_name);
		for error in &errors {
			message.push_str("\n    ");
			message.push_str(error);
		}
		error!(
			target = "ap.session",
			codes = ?error_codes,
			kind = ?kind,
			"{message}"
		);

		if kind == AttemptKind::Explicit {
			self.inner.state.lock().info = None;
		}
		ConnectionResult::Timeout { message }
	}
}

impl SupervisorInner {
	/// Ends the live session if it matches `generation` (any session when `None`).
	fn end_live_session(&self, generation: Option<u64>) {
		let live = {
			let mut state = self.state.lock();
			let keep = match (&state.live, generation) {
				(None, _) => true,
				(Some(live), Some(generation)) => live.generation != generation,
				(Some(_), None) => false,
			};
			if keep {
				return;
			}
			state.live.take()
		};
		let Some(live) = live else {
			return;
		};

		self.generation.fetch_add(1, Ordering::SeqCst);
		debug!(target = "ap.session", generation = live.generation, "Cleaning up session");
		live.session.unsubscribe();
		spawn_disconnect(live.session);
	}

	/// Handles a transport fault reported by the pump of `generation`.
	fn fault(&self, event: SessionEvent, generation: u64) {
		let message = match event {
			SessionEvent::SocketError(reason) => format!("Archipelago connection error: {reason}"),
			SessionEvent::SocketClosed(reason) => format!("Archipelago connection closed: {reason}"),
			_ => return,
		};
		error!(target = "ap.session", generation, "{message}");
		self.integration.on_error(&message);
		self.state.lock().retry.record_failure();
		self.end_live_session(Some(generation));
	}
}

/// Closes `session` on the runtime without waiting for it.
fn spawn_disconnect(session: Arc<dyn Session>) {
	match tokio::runtime::Handle::try_current() {
		Ok(handle) => {
			handle.spawn(async move { session.disconnect().await });
		}
		Err(_) => debug!(target = "ap.session", "No runtime to close the session on"),
	}
}
