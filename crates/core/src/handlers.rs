//! Event handler registry.
//!
//! Handlers live in an [`IndexMap`] so removal is O(1) and dispatch follows
//! registration order. Registering returns a [`Subscription`] that removes the
//! handler again when dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::warn;

/// Unique identifier for event handlers.
pub type HandlerId = u64;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique handler ID.
pub fn next_handler_id() -> HandlerId {
	NEXT_HANDLER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Boxed async handler future.
pub type HandlerFuture = Pin<Box<dyn Future<Output = ap_runtime::Result<()>> + Send>>;

/// Handler function: `E` to async `Result<()>`.
pub type HandlerFn<E> = Arc<dyn Fn(E) -> HandlerFuture + Send + Sync>;

pub struct HandlerEntry<E> {
	pub id: HandlerId,
	pub handler: HandlerFn<E>,
}

impl<E> Clone for HandlerEntry<E> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			handler: Arc::clone(&self.handler),
		}
	}
}

/// Handler storage: [`IndexMap`] for O(1) removal with stable insertion order.
pub type HandlerMap<E> = Arc<Mutex<IndexMap<HandlerId, HandlerEntry<E>>>>;

/// Creates an empty handler map.
pub fn handler_map<E>() -> HandlerMap<E> {
	Arc::new(Mutex::new(IndexMap::new()))
}

/// Adds `handler` to `handlers`.
pub fn register<E, F, Fut>(handlers: &HandlerMap<E>, handler: F) -> Subscription
where
	E: Send + Sync + 'static,
	F: Fn(E) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = ap_runtime::Result<()>> + Send + 'static,
{
	let id = next_handler_id();
	let handler: HandlerFn<E> = Arc::new(move |event: E| -> HandlerFuture { Box::pin(handler(event)) });
	handlers.lock().insert(id, HandlerEntry { id, handler });
	Subscription::from_handler_map(id, handlers)
}

/// Runs every handler in `handlers` on `event`, one after another.
///
/// The map is snapshotted first, so handlers may register or drop
/// subscriptions while running. Handler errors are logged and do not stop
/// later handlers.
pub async fn dispatch<E: Clone>(handlers: &HandlerMap<E>, event: &E, kind: &'static str) {
	let entries: Vec<HandlerEntry<E>> = handlers.lock().values().cloned().collect();
	for entry in entries {
		if let Err(error) = (entry.handler)(event.clone()).await {
			warn!(target = "ap.events", handler_id = entry.id, kind, %error, "Event handler failed");
		}
	}
}

/// RAII handle that unregisters an event handler on drop.
///
/// Holds a weak reference to the handler map, so dropping it after the
/// client is gone is a no-op.
pub struct Subscription {
	id: HandlerId,
	dropper: Option<Arc<dyn Fn(HandlerId) + Send + Sync>>,
}

impl Subscription {
	pub fn new(id: HandlerId, dropper: Arc<dyn Fn(HandlerId) + Send + Sync>) -> Self {
		Self {
			id,
			dropper: Some(dropper),
		}
	}

	/// Creates a subscription from a handler map using a weak reference.
	pub fn from_handler_map<E>(id: HandlerId, handlers: &HandlerMap<E>) -> Self
	where
		E: Send + Sync + 'static,
	{
		let weak: Weak<Mutex<IndexMap<HandlerId, HandlerEntry<E>>>> = Arc::downgrade(handlers);
		let dropper = Arc::new(move |id: HandlerId| {
			if let Some(map) = weak.upgrade() {
				map.lock().shift_remove(&id);
			}
		});
		Self::new(id, dropper)
	}

	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}

	/// Keeps the handler registered for the lifetime of its map.
	pub fn detach(mut self) {
		self.dropper = None;
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.dropper.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use super::*;

	#[test]
	fn test_handler_id_increments() {
		let id1 = next_handler_id();
		let id2 = next_handler_id();
		assert!(id2 > id1);
	}

	#[test]
	fn test_subscription_drop_removes_handler() {
		let map: HandlerMap<String> = handler_map();
		{
			let _sub = register(&map, |_: String| async { Ok(()) });
			assert_eq!(map.lock().len(), 1);
		}
		assert_eq!(map.lock().len(), 0);
	}

	#[test]
	fn test_subscription_detach_keeps_handler() {
		let map: HandlerMap<String> = handler_map();
		register(&map, |_: String| async { Ok(()) }).detach();
		assert_eq!(map.lock().len(), 1);
	}

	#[test]
	fn test_subscription_weak_reference() {
		let map: HandlerMap<String> = handler_map();
		let sub = register(&map, |_: String| async { Ok(()) });
		drop(map);
		drop(sub);
	}

	#[test]
	fn test_subscription_unsubscribe_calls_dropper() {
		let called = Arc::new(AtomicBool::new(false));
		let flag = Arc::clone(&called);
		let sub = Subscription::new(1, Arc::new(move |_| flag.store(true, Ordering::SeqCst)));
		assert!(!called.load(Ordering::SeqCst));
		sub.unsubscribe();
		assert!(called.load(Ordering::SeqCst));
	}

	#[tokio::test]
	async fn test_dispatch_runs_in_order_past_errors() {
		let map: HandlerMap<u32> = handler_map();
		let seen = Arc::new(Mutex::new(Vec::new()));

		let first = Arc::clone(&seen);
		let _a = register(&map, move |n: u32| {
			first.lock().push(("first", n));
			async { Err(ap_runtime::Error::NotConnected) }
		});
		let second = Arc::clone(&seen);
		let _b = register(&map, move |n: u32| {
			second.lock().push(("second", n));
			async { Ok(()) }
		});

		dispatch(&map, &7, "test").await;
		assert_eq!(*seen.lock(), vec![("first", 7), ("second", 7)]);
	}
}
