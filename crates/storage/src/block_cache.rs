//! Block-scoped cache
//!
//! Entries are valid for one chain tick: every tick advances the chain's
//! epoch and entries written under an older epoch stop resolving. Used for
//! prices and gas data whose staleness tolerance is "one block".

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use swapflow_types::ChainId;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct BlockCache<K, V>
where
	K: Eq + Hash,
{
	entries: DashMap<(ChainId, K), (u64, V)>,
	epochs: DashMap<ChainId, u64>,
}

impl<K, V> Default for BlockCache<K, V>
where
	K: Eq + Hash,
{
	fn default() -> Self {
		Self {
			entries: DashMap::new(),
			epochs: DashMap::new(),
		}
	}
}

impl<K, V> BlockCache<K, V>
where
	K: Eq + Hash + Clone + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self::default()
	}

	fn epoch(&self, chain_id: ChainId) -> u64 {
		self.epochs.get(&chain_id).map(|e| *e).unwrap_or(0)
	}

	pub fn get(&self, chain_id: ChainId, key: &K) -> Option<V> {
		let epoch = self.epoch(chain_id);
		let entry = self.entries.get(&(chain_id, key.clone()))?;
		(entry.0 == epoch).then(|| entry.1.clone())
	}

	pub fn set(&self, chain_id: ChainId, key: K, value: V) {
		let epoch = self.epoch(chain_id);
		self.entries.insert((chain_id, key), (epoch, value));
	}

	/// Advance the chain's epoch; existing entries for it become stale.
	pub fn invalidate(&self, chain_id: ChainId) {
		*self.epochs.entry(chain_id).or_insert(0) += 1;
		self.entries.retain(|(chain, _), _| *chain != chain_id);
	}

	/// Spawn the listener that invalidates per-chain entries on every tick.
	pub fn attach_ticks(
		self: &Arc<Self>,
		mut ticks: broadcast::Receiver<ChainId>,
	) -> JoinHandle<()> {
		let cache = Arc::clone(self);
		tokio::spawn(async move {
			loop {
				match ticks.recv().await {
					Ok(chain_id) => cache.invalidate(chain_id),
					Err(broadcast::error::RecvError::Lagged(skipped)) => {
						// Missed ticks only mean we invalidate late; drop
						// everything to stay safe.
						debug!(skipped, "tick stream lagged, flushing block cache");
						let chains: Vec<ChainId> =
							cache.epochs.iter().map(|entry| *entry.key()).collect();
						for chain_id in chains {
							cache.invalidate(chain_id);
						}
					}
					Err(broadcast::error::RecvError::Closed) => break,
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entries_survive_within_one_epoch() {
		let cache = BlockCache::new();
		cache.set(1, "gas", 100u64);
		assert_eq!(cache.get(1, &"gas"), Some(100));
	}

	#[test]
	fn invalidation_is_per_chain() {
		let cache = BlockCache::new();
		cache.set(1, "gas", 100u64);
		cache.set(137, "gas", 30u64);

		cache.invalidate(1);

		assert_eq!(cache.get(1, &"gas"), None);
		assert_eq!(cache.get(137, &"gas"), Some(30));
	}

	#[tokio::test]
	async fn ticks_invalidate_asynchronously() {
		let cache = Arc::new(BlockCache::new());
		let (tx, rx) = broadcast::channel(8);
		let handle = cache.attach_ticks(rx);

		cache.set(1, "rate", 42u64);
		tx.send(1).unwrap();
		tokio::task::yield_now().await;

		// Give the listener a moment; broadcast delivery is asynchronous.
		for _ in 0..100 {
			if cache.get(1, &"rate").is_none() {
				break;
			}
			tokio::time::sleep(std::time::Duration::from_millis(1)).await;
		}
		assert_eq!(cache.get(1, &"rate"), None);

		drop(tx);
		let _ = handle.await;
	}
}
