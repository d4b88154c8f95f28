//! Persistent key-value capability
//!
//! Deliberately small: get/set/remove of raw strings, with typed helpers
//! layered on top. Writes are fire-and-forget; no transactional guarantees
//! exist across keys and none are assumed.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error(transparent)]
	Serialization(#[from] serde_json::Error),

	#[error("storage backend error: {0}")]
	Backend(String),
}

/// Raw durable string storage.
pub trait KeyValueStore: Send + Sync {
	fn get_raw(&self, key: &str) -> Option<String>;

	fn set_raw(&self, key: &str, value: String);

	fn remove_raw(&self, key: &str);
}

/// Typed helpers over any raw store. Malformed persisted data reads as
/// absent, matching the restore-silently contract of the pair state.
pub trait KeyValueStoreExt: KeyValueStore {
	fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let raw = self.get_raw(key)?;
		match serde_json::from_str(&raw) {
			Ok(value) => Some(value),
			Err(err) => {
				warn!(key, %err, "discarding malformed persisted value");
				None
			}
		}
	}

	fn set<T: Serialize>(&self, key: &str, value: &T) {
		match serde_json::to_string(value) {
			Ok(raw) => self.set_raw(key, raw),
			Err(err) => warn!(key, %err, "failed to serialize value for storage"),
		}
	}
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
