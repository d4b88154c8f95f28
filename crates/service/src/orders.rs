//! Order repository
//!
//! Short-TTL persisted mapping from order hash to the metadata needed to
//! resume status tracking after a reload. Expired records are swept lazily,
//! throttled by a persisted guard so reloads do not rescan the namespace on
//! every save.

use alloy_primitives::B256;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use swapflow_storage::{LongTermCache, TtlGuard};
use swapflow_types::{KeyValueStore, OrderRecord, OrderStore, StorageResult};

const ORDERS_NAMESPACE: &str = "strategy-orders";
const SWEEP_GUARD_KEY: &str = "strategy-orders-swept-at";

pub const ORDER_TTL_DAYS: i64 = 3;
const SWEEP_WINDOW_HOURS: i64 = 12;

pub struct OrderBook {
	records: LongTermCache<OrderRecord>,
	sweep_guard: TtlGuard,
}

impl OrderBook {
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self::with_ttl(store, ORDER_TTL_DAYS, SWEEP_WINDOW_HOURS)
	}

	pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl_days: i64, sweep_hours: i64) -> Self {
		Self {
			records: LongTermCache::new(store.clone(), ORDERS_NAMESPACE, ttl_days),
			sweep_guard: TtlGuard::new(store, SWEEP_GUARD_KEY, Duration::hours(sweep_hours)),
		}
	}

	fn maybe_sweep(&self) {
		if self.sweep_guard.is_expired() {
			self.records.sweep();
			self.sweep_guard.reset();
		}
	}
}

#[async_trait]
impl OrderStore for OrderBook {
	async fn save_order(&self, record: OrderRecord) -> StorageResult<()> {
		self.maybe_sweep();
		self.records.set(record.hash.to_string(), record);
		Ok(())
	}

	async fn get_order(&self, hash: &B256) -> StorageResult<Option<OrderRecord>> {
		Ok(self.records.get(&hash.to_string()))
	}

	async fn delete_order(&self, hash: &B256) -> StorageResult<()> {
		self.records.remove(&hash.to_string());
		Ok(())
	}
}
