//! On-chain capability trait
//!
//! The orchestrator never talks to an RPC endpoint directly; everything it
//! needs from a chain goes through [`ChainClient`].

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use super::ChainId;
use crate::tokens::Token;

#[derive(Debug, Error)]
pub enum ChainError {
	#[error("chain {0} is not supported")]
	UnsupportedChain(ChainId),

	#[error("gas estimation failed: {reason}")]
	GasEstimation { reason: String },

	#[error("transaction {hash} failed or was dropped")]
	TransactionFailed { hash: B256 },

	#[error("rpc error: {0}")]
	Rpc(String),
}

/// EIP-1559 style gas fee quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPrice {
	pub max_fee_per_gas: U256,
	pub max_priority_fee_per_gas: U256,
}

impl GasPrice {
	/// Per-gas-unit fee budget used for worst-case fee reservations.
	pub fn total_per_gas(&self) -> U256 {
		self.max_fee_per_gas.saturating_add(self.max_priority_fee_per_gas)
	}
}

/// A transaction to simulate or submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
	pub chain_id: ChainId,
	pub from: Address,
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
}

/// Read/simulate/await access to the supported chains.
#[async_trait]
pub trait ChainClient: Send + Sync {
	async fn allowance(
		&self,
		chain_id: ChainId,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, ChainError>;

	async fn token_balance(
		&self,
		chain_id: ChainId,
		token: &Token,
		owner: Address,
	) -> Result<U256, ChainError>;

	/// Simulate a transaction, returning the gas it would consume. An `Err`
	/// means the transaction would revert.
	async fn estimate_gas(&self, tx: &TxRequest) -> Result<U256, ChainError>;

	async fn gas_price(&self, chain_id: ChainId) -> Result<GasPrice, ChainError>;

	/// Resolve once the transaction is confirmed, or fail if it reverted.
	async fn wait_for_transaction(&self, chain_id: ChainId, hash: B256) -> Result<(), ChainError>;

	/// New-block tick events across all supported chains.
	fn ticks(&self) -> broadcast::Receiver<ChainId>;
}
