//! Order repository contract

use alloy_primitives::B256;
use async_trait::async_trait;

use super::OrderRecord;
use crate::storage::StorageResult;

/// Short-TTL persisted mapping from order hash to resume metadata.
#[async_trait]
pub trait OrderStore: Send + Sync {
	async fn save_order(&self, record: OrderRecord) -> StorageResult<()>;

	/// `None` for unknown hashes and for records past their TTL.
	async fn get_order(&self, hash: &B256) -> StorageResult<Option<OrderRecord>>;

	async fn delete_order(&self, hash: &B256) -> StorageResult<()>;
}
