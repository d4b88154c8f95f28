//! Swap strategy contract
//!
//! A strategy owns one swap protocol variant end to end: quoting, execution,
//! preparation steps and order tracking. Strategies are stateless with respect
//! to the pair; all pair state flows in as parameters.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::orders::SwapOrderStatus;
use crate::resolver::ResolverActions;
use crate::snapshots::StrategySnapshot;
use crate::tokens::TokenPair;

mod errors;

pub use errors::{StrategyError, StrategyResult};

#[async_trait]
pub trait SwapStrategy: Send + Sync {
	/// Registry name; snapshots and order records reference it for dispatch.
	fn name(&self) -> &str;

	/// Cheap support probe for UI affordances. Quoting performs its own,
	/// authoritative checks.
	async fn supports(&self, pair: &TokenPair, wallet_address: Option<Address>) -> bool;

	/// Produce a data snapshot for the pair and amount.
	///
	/// A strategy that cannot quote (unsupported pair, no liquidity, venue
	/// failure) must return an error so resolution can fall through to the
	/// next strategy; `finalize` locks in executable quote parameters.
	async fn quote(
		&self,
		pair: &TokenPair,
		amount: Decimal,
		wallet_address: Option<Address>,
		finalize: bool,
	) -> StrategyResult<StrategySnapshot>;

	/// Execute the quoted swap, returning the order/transaction hash.
	async fn swap(&self, snapshot: &StrategySnapshot) -> StrategyResult<B256>;

	/// Prerequisite steps the caller must await before `swap`.
	async fn prepare_swap(&self, snapshot: &StrategySnapshot) -> StrategyResult<ResolverActions>;

	/// Default implementation reports the operation as unsupported. Override
	/// when the protocol tracks orders.
	async fn order_status(&self, hash: B256) -> StrategyResult<SwapOrderStatus> {
		let _ = hash;
		Err(StrategyError::UnsupportedOperation {
			operation: "order_status".into(),
			strategy: self.name().into(),
		})
	}

	/// Default implementation reports the operation as unsupported. Override
	/// when the protocol supports cancellation.
	async fn cancel_order(&self, hash: B256) -> StrategyResult<Option<B256>> {
		let _ = hash;
		Err(StrategyError::UnsupportedOperation {
			operation: "cancel_order".into(),
			strategy: self.name().into(),
		})
	}
}

/// Maximum spendable source amount for the connected wallet, gas reserve
/// already deducted for native assets.
#[async_trait]
pub trait AmountSource: Send + Sync {
	async fn max_amount(&self) -> Decimal;
}
