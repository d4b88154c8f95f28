//! Single-timestamp TTL guard
//!
//! One persisted "last reset" timestamp plus a fixed expiry window, for
//! binary is-this-stale checks. A guard that was never reset reads as
//! expired.

use chrono::{Duration, Utc};
use std::sync::Arc;
use swapflow_types::{KeyValueStore, KeyValueStoreExt};

pub struct TtlGuard {
	key: String,
	window: Duration,
	store: Arc<dyn KeyValueStore>,
}

impl TtlGuard {
	pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, window: Duration) -> Self {
		Self {
			key: key.into(),
			window,
			store,
		}
	}

	pub fn reset(&self) {
		self.store.set(&self.key, &Utc::now().timestamp_millis());
	}

	pub fn is_expired(&self) -> bool {
		match self.store.get::<i64>(&self.key) {
			Some(millis) => Utc::now().timestamp_millis() - millis > self.window.num_milliseconds(),
			None => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory_store::MemoryStore;

	#[test]
	fn unset_guard_is_expired() {
		let guard = TtlGuard::new(Arc::new(MemoryStore::new()), "auth", Duration::hours(12));
		assert!(guard.is_expired());
	}

	#[test]
	fn reset_makes_guard_fresh() {
		let guard = TtlGuard::new(Arc::new(MemoryStore::new()), "auth", Duration::hours(12));
		guard.reset();
		assert!(!guard.is_expired());
	}

	#[test]
	fn stale_timestamp_reads_as_expired() {
		let store = Arc::new(MemoryStore::new());
		let stale = (Utc::now() - Duration::hours(13)).timestamp_millis();
		store.set("auth", &stale);

		let guard = TtlGuard::new(store, "auth", Duration::hours(12));
		assert!(guard.is_expired());
	}
}
