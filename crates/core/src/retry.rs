//! Reconnection backoff bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

/// When the last connection failure happened and whether retries are allowed.
#[derive(Debug, Clone)]
pub struct RetryState {
	last_failure: Option<Instant>,
	/// Cooldown used when the caller does not pick one.
	threshold: Duration,
	allow_retries: bool,
}

impl RetryState {
	pub fn new(threshold: Duration) -> Self {
		Self {
			last_failure: None,
			threshold,
			allow_retries: true,
		}
	}

	pub fn threshold(&self) -> Duration {
		self.threshold
	}

	pub fn record_failure(&mut self) {
		self.last_failure = Some(Instant::now());
	}

	/// Returns true while less than `cooldown` has passed since the last failure.
	pub fn is_cooling_down(&self, cooldown: Duration) -> bool {
		self.last_failure
			.is_some_and(|failed_at| failed_at.elapsed() < cooldown)
	}

	pub fn allows_retries(&self) -> bool {
		self.allow_retries
	}

	pub fn suspend(&mut self) {
		self.allow_retries = false;
	}

	pub fn resume(&mut self) {
		self.allow_retries = true;
	}
}
