//! Long-lived persisted cache
//!
//! A namespaced map persisted through the injected [`KeyValueStore`], with a
//! multi-day per-entry TTL. Expired entries are dropped on read; `sweep`
//! removes them in bulk. Used for order records and other data that must
//! survive a reload.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use swapflow_types::{KeyValueStore, KeyValueStoreExt};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry<V> {
	value: V,
	stored_at: DateTime<Utc>,
}

pub struct LongTermCache<V> {
	namespace: String,
	ttl: Duration,
	store: Arc<dyn KeyValueStore>,
	entries: Mutex<HashMap<String, PersistedEntry<V>>>,
}

impl<V> LongTermCache<V>
where
	V: Clone + Serialize + DeserializeOwned,
{
	/// Load the namespace from storage; missing or malformed state starts
	/// empty.
	pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>, ttl_days: i64) -> Self {
		let namespace = namespace.into();
		let entries = store
			.get::<HashMap<String, PersistedEntry<V>>>(&namespace)
			.unwrap_or_default();
		Self {
			namespace,
			ttl: Duration::days(ttl_days),
			store,
			entries: Mutex::new(entries),
		}
	}

	fn is_expired(&self, entry: &PersistedEntry<V>, now: DateTime<Utc>) -> bool {
		now - entry.stored_at > self.ttl
	}

	fn persist(&self, entries: &HashMap<String, PersistedEntry<V>>) {
		self.store.set(&self.namespace, entries);
	}

	pub fn get(&self, key: &str) -> Option<V> {
		let mut entries = self.entries.lock().expect("long-term cache lock poisoned");
		let expired = entries
			.get(key)
			.is_some_and(|entry| self.is_expired(entry, Utc::now()));
		if expired {
			entries.remove(key);
			self.persist(&entries);
			return None;
		}
		entries.get(key).map(|entry| entry.value.clone())
	}

	pub fn set(&self, key: impl Into<String>, value: V) {
		let mut entries = self.entries.lock().expect("long-term cache lock poisoned");
		entries.insert(
			key.into(),
			PersistedEntry {
				value,
				stored_at: Utc::now(),
			},
		);
		self.persist(&entries);
	}

	pub fn remove(&self, key: &str) {
		let mut entries = self.entries.lock().expect("long-term cache lock poisoned");
		if entries.remove(key).is_some() {
			self.persist(&entries);
		}
	}

	/// Drop every expired entry, returning how many were removed.
	pub fn sweep(&self) -> usize {
		let mut entries = self.entries.lock().expect("long-term cache lock poisoned");
		let now = Utc::now();
		let before = entries.len();
		entries.retain(|_, entry| !self.is_expired(entry, now));
		let removed = before - entries.len();
		if removed > 0 {
			debug!(namespace = %self.namespace, removed, "swept expired entries");
			self.persist(&entries);
		}
		removed
	}

	pub fn len(&self) -> usize {
		self.entries.lock().expect("long-term cache lock poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory_store::MemoryStore;

	fn seeded_store(stored_at: DateTime<Utc>) -> MemoryStore {
		let store = MemoryStore::new();
		let mut entries = HashMap::new();
		entries.insert(
			"old".to_string(),
			PersistedEntry {
				value: "stale".to_string(),
				stored_at,
			},
		);
		store.set("orders", &entries);
		store
	}

	#[test]
	fn roundtrip_survives_reload() {
		let store = Arc::new(MemoryStore::new());
		{
			let cache: LongTermCache<String> = LongTermCache::new(store.clone(), "orders", 3);
			cache.set("0xabc", "record".to_string());
		}
		let reloaded: LongTermCache<String> = LongTermCache::new(store, "orders", 3);
		assert_eq!(reloaded.get("0xabc"), Some("record".to_string()));
	}

	#[test]
	fn entries_inside_ttl_are_served() {
		let store = Arc::new(seeded_store(Utc::now() - Duration::days(2)));
		let cache: LongTermCache<String> = LongTermCache::new(store, "orders", 3);
		assert_eq!(cache.get("old"), Some("stale".to_string()));
	}

	#[test]
	fn entries_past_ttl_read_as_absent() {
		let store = Arc::new(seeded_store(Utc::now() - Duration::days(4)));
		let cache: LongTermCache<String> = LongTermCache::new(store, "orders", 3);
		assert_eq!(cache.get("old"), None);
		assert!(cache.is_empty());
	}

	#[test]
	fn sweep_reports_removed_entries() {
		let store = Arc::new(seeded_store(Utc::now() - Duration::days(4)));
		let cache: LongTermCache<String> = LongTermCache::new(store, "orders", 3);
		cache.set("fresh", "kept".to_string());
		assert_eq!(cache.sweep(), 1);
		assert_eq!(cache.get("fresh"), Some("kept".to_string()));
	}
}
