//! Order domain model
//!
//! An [`OrderRecord`] is the minimal slice of data needed to re-resolve which
//! strategy owns a submitted order after a reload; full status lives with the
//! venue and is fetched on demand.

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainId;
use crate::storage::StorageError;

mod storage;

pub use storage::OrderStore;

/// Persisted per-order metadata; created on submit, deleted on terminal state
/// or TTL expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
	pub hash: B256,
	pub src_token_address: Address,
	pub src_chain_id: ChainId,
	pub dst_token_address: Address,
	pub dst_chain_id: ChainId,
	pub strategy_name: String,
	pub account: Address,
}

/// Lifecycle state of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	Pending,
	Executed,
	Expired,
	Cancelled,
	Refunding,
	Refunded,
	Failed,
}

impl OrderStatus {
	/// Terminal states allow the order record to be dropped.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, OrderStatus::Pending | OrderStatus::Refunding)
	}
}

/// Full status view of a tracked order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapOrderStatus {
	pub status: OrderStatus,
	pub src_chain_id: ChainId,
	pub src_token_address: Address,
	pub dst_chain_id: ChainId,
	pub dst_token_address: Address,
	pub making_amount: U256,
	pub taking_amount: U256,
	pub auction_duration_secs: u64,
	pub auction_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum OrderError {
	#[error("order {hash} not found")]
	NotFound { hash: B256 },

	#[error("order {hash} is already cancelled")]
	AlreadyCancelled { hash: B256 },

	#[error("order belongs to a different account")]
	WrongAccount,

	#[error("switch the wallet to chain {expected} before cancelling")]
	WrongNetwork { expected: ChainId },

	#[error(transparent)]
	Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn terminal_states() {
		assert!(!OrderStatus::Pending.is_terminal());
		assert!(!OrderStatus::Refunding.is_terminal());
		assert!(OrderStatus::Executed.is_terminal());
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(OrderStatus::Failed.is_terminal());
	}
}
