//! Event pump: one task per live session.

use std::sync::{Arc, Weak};
use std::sync::atomic::Ordering;

use ap_runtime::SessionEvent;
use tokio::sync::mpsc;
use tracing::trace;

use super::SupervisorInner;

/// Forwards session events to the signal hub until the session ends.
///
/// Stops when the queue closes, the supervisor is dropped, or a newer session
/// has taken over.
pub(super) async fn run(
	supervisor: Weak<SupervisorInner>,
	mut events: mpsc::UnboundedReceiver<SessionEvent>,
	generation: u64,
) {
	while let Some(event) = events.recv().await {
		let Some(inner) = supervisor.upgrade() else {
			break;
		};
		if inner.generation.load(Ordering::SeqCst) != generation {
			trace!(target = "ap.session", generation, "Dropping event of a stale session");
			break;
		}
		if event.is_fault() {
			inner.fault(event, generation);
			break;
		}
		let signals = Arc::clone(&inner.signals);
		drop(inner);
		signals.forward(event).await;
	}
	trace!(target = "ap.session", generation, "Event pump stopped");
}
