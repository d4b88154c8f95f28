//! Spot strategy
//!
//! Display-only quote derived from the aggregated on-chain oracle rate; the
//! last-resort fallback when no executing venue covers the pair. Execution
//! and order tracking are unsupported by design.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_types::{
	Address, RateProviding, ResolverActions, SnapshotOptions, StrategyError, StrategyResult,
	StrategySnapshot, SwapStrategy, TokenPair, B256,
};

pub const SPOT_STRATEGY_NAME: &str = "spot";

pub struct SpotStrategy {
	rates: Arc<dyn RateProviding>,
}

impl SpotStrategy {
	pub fn new(rates: Arc<dyn RateProviding>) -> Self {
		Self { rates }
	}
}

#[async_trait]
impl SwapStrategy for SpotStrategy {
	fn name(&self) -> &str {
		SPOT_STRATEGY_NAME
	}

	async fn supports(&self, pair: &TokenPair, _wallet_address: Option<Address>) -> bool {
		if pair.source.chain_id != pair.destination.chain_id {
			return false;
		}
		self.rates
			.on_chain_rate(pair.source.chain_id, &pair.source, &pair.destination)
			.await
			.is_some_and(|rate| {
				!rate.rate.is_zero() && !rate.rate.is_sign_negative()
			})
	}

	async fn quote(
		&self,
		pair: &TokenPair,
		amount: Decimal,
		wallet_address: Option<Address>,
		_finalize: bool,
	) -> StrategyResult<StrategySnapshot> {
		if pair.source.chain_id != pair.destination.chain_id {
			return Err(StrategyError::Unsupported {
				strategy: self.name().into(),
			});
		}
		if amount.is_zero() {
			return Err(StrategyError::ZeroAmount);
		}

		let rate = self
			.rates
			.on_chain_rate(pair.source.chain_id, &pair.source, &pair.destination)
			.await
			.ok_or(StrategyError::NoRate)?;

		let destination_amount = rate.apply(amount);

		Ok(StrategySnapshot {
			wallet_address,
			source_token: pair.source.clone(),
			destination_token: pair.destination.clone(),
			source_amount: amount,
			destination_amount,
			options: SnapshotOptions {
				rate: Some(rate.clone()),
				min_receive: Some(destination_amount),
				// no execution path, so no fee to estimate yet
				network_fee: None,
				..SnapshotOptions::default()
			},
			rate,
			strategy_name: self.name().into(),
			provider_data: None,
		})
	}

	async fn swap(&self, _snapshot: &StrategySnapshot) -> StrategyResult<B256> {
		Err(StrategyError::UnsupportedOperation {
			operation: "swap".into(),
			strategy: self.name().into(),
		})
	}

	async fn prepare_swap(&self, _snapshot: &StrategySnapshot) -> StrategyResult<ResolverActions> {
		Ok(Vec::new())
	}
}
