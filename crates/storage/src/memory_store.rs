//! In-memory key-value store backed by DashMap
//!
//! The durable-storage stand-in used by tests and demos; production embedders
//! plug their own [`KeyValueStore`] (browser storage, disk, ...).

use dashmap::DashMap;
use swapflow_types::KeyValueStore;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
	entries: std::sync::Arc<DashMap<String, String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl KeyValueStore for MemoryStore {
	fn get_raw(&self, key: &str) -> Option<String> {
		self.entries.get(key).map(|entry| entry.value().clone())
	}

	fn set_raw(&self, key: &str, value: String) {
		self.entries.insert(key.to_string(), value);
	}

	fn remove_raw(&self, key: &str) {
		self.entries.remove(key);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use swapflow_types::KeyValueStoreExt;

	#[test]
	fn typed_roundtrip() {
		let store = MemoryStore::new();
		store.set("answer", &42u32);
		assert_eq!(store.get::<u32>("answer"), Some(42));

		store.remove_raw("answer");
		assert_eq!(store.get::<u32>("answer"), None);
	}

	#[test]
	fn malformed_values_read_as_absent() {
		let store = MemoryStore::new();
		store.set_raw("broken", "{not json".into());
		assert_eq!(store.get::<u32>("broken"), None);
	}
}
