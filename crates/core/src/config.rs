//! Client configuration.

use std::time::Duration;

use ap_protocol::{ItemsHandling, NetworkVersion};

/// Tag every client connects with.
pub const BASE_TAG: &str = "AP";

/// Protocol version announced in `Connect`.
pub const CLIENT_VERSION: NetworkVersion = NetworkVersion::new(0, 6, 1);

/// Tunables of a [`Client`](crate::Client).
///
/// ```ignore
/// let config = ClientConfig::default()
///     .with_retry_threshold(Duration::from_secs(30))
///     .with_request_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
	pub client_version: NetworkVersion,
	pub items_handling: ItemsHandling,
	/// Tags sent with every login, before any opt-in tag.
	pub base_tags: Vec<String>,
	/// Cooldown used by connected-gated operations after a failure.
	pub retry_threshold: Duration,
	/// Cooldown used by [`Client::update`](crate::Client::update).
	pub update_threshold: Duration,
	/// Bound on opening a session and logging in.
	pub connect_timeout: Duration,
	/// Bound on scout requests.
	pub request_timeout: Duration,
	/// Bound on hint retrieval. Past it, hints degrade to an empty list.
	pub hint_timeout: Duration,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			client_version: CLIENT_VERSION,
			items_handling: ItemsHandling::ALL,
			base_tags: vec![BASE_TAG.to_string()],
			retry_threshold: Duration::from_secs(15),
			update_threshold: Duration::from_secs(60),
			connect_timeout: Duration::from_secs(30),
			request_timeout: Duration::from_secs(10),
			hint_timeout: Duration::from_secs(2),
		}
	}
}

impl ClientConfig {
	pub fn with_client_version(mut self, version: NetworkVersion) -> Self {
		self.client_version = version;
		self
	}

	pub fn with_items_handling(mut self, items_handling: ItemsHandling) -> Self {
		self.items_handling = items_handling;
		self
	}

	pub fn with_base_tags(mut self, tags: Vec<String>) -> Self {
		self.base_tags = tags;
		self
	}

	pub fn with_retry_threshold(mut self, threshold: Duration) -> Self {
		self.retry_threshold = threshold;
		self
	}

	pub fn with_update_threshold(mut self, threshold: Duration) -> Self {
		self.update_threshold = threshold;
		self
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn with_hint_timeout(mut self, timeout: Duration) -> Self {
		self.hint_timeout = timeout;
		self
	}
}
