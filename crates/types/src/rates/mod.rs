//! Exchange-rate model and the rate-source capability
//!
//! Both orientations of a rate are always computed together so no consumer
//! ever inverts a rate across a chain-specific precision boundary.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::AmountError;
use crate::chain::{ChainError, ChainId};
use crate::tokens::Token;

/// Where a rate was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateSource {
	OnChain,
	Intent,
	CrossChainIntent,
	Deposit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
	pub source: RateSource,
	/// Set when the oracle quoted destination-per-source inverted.
	pub is_reverted: bool,
	pub rate: Decimal,
	pub reverted_rate: Decimal,
	pub source_token: Token,
	pub destination_token: Token,
}

impl Rate {
	/// A rate quoted in the direct orientation; the reverted side is derived.
	pub fn direct(
		source: RateSource,
		rate: Decimal,
		source_token: Token,
		destination_token: Token,
	) -> Self {
		let reverted_rate = if rate.is_zero() { Decimal::ZERO } else { Decimal::ONE / rate };
		Self {
			source,
			is_reverted: false,
			rate,
			reverted_rate,
			source_token,
			destination_token,
		}
	}

	/// Orientation-aware magnitude, comparable across adapters.
	pub fn effective(&self) -> Decimal {
		if self.is_reverted {
			self.reverted_rate
		} else {
			self.rate
		}
	}

	/// Convert a source amount into the destination amount this rate implies.
	pub fn apply(&self, amount: Decimal) -> Decimal {
		if self.is_reverted {
			if self.reverted_rate.is_zero() {
				Decimal::ZERO
			} else {
				amount / self.reverted_rate
			}
		} else {
			amount * self.rate
		}
	}
}

#[derive(Debug, Error)]
pub enum RateError {
	#[error("no oracle coverage for chain {0}")]
	UnsupportedChain(ChainId),

	#[error("oracle returned an empty or zero rate")]
	EmptyRate,

	#[error(transparent)]
	Chain(#[from] ChainError),

	#[error(transparent)]
	Amount(#[from] AmountError),
}

/// One on-chain price oracle family, scoped to a subset of chains.
#[async_trait]
pub trait RateSourceAdapter: Send + Sync {
	fn name(&self) -> &str;

	fn supports_chain(&self, chain_id: ChainId) -> bool;

	async fn rate(
		&self,
		chain_id: ChainId,
		source: &Token,
		destination: &Token,
	) -> Result<Rate, RateError>;
}

/// Aggregated on-chain rate lookup exposed to strategies.
#[async_trait]
pub trait RateProviding: Send + Sync {
	/// Best available on-chain rate, `None` when no adapter can quote the pair.
	async fn on_chain_rate(
		&self,
		chain_id: ChainId,
		source: &Token,
		destination: &Token,
	) -> Option<Rate>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	fn usdc() -> Token {
		Token {
			chain_id: 1,
			address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap(),
			symbol: "USDC".into(),
			decimals: 6,
			name: "USD Coin".into(),
			supports_cross_chain: true,
			is_internal_wrap_token: false,
		}
	}

	fn weth() -> Token {
		crate::chain::wrapped_native_token(1).unwrap()
	}

	#[test]
	fn direct_rate_derives_reverted_side() {
		let rate = Rate::direct(RateSource::OnChain, dec!(2000), weth(), usdc());
		assert_eq!(rate.reverted_rate, dec!(0.0005));
		assert_eq!(rate.effective(), dec!(2000));
	}

	#[test]
	fn apply_honors_orientation() {
		let mut rate = Rate::direct(RateSource::OnChain, dec!(2000), weth(), usdc());
		assert_eq!(rate.apply(dec!(1.5)), dec!(3000));

		rate.is_reverted = true;
		rate.reverted_rate = dec!(0.0005);
		assert_eq!(rate.apply(dec!(1.5)), dec!(3000));
	}

	#[test]
	fn zero_rate_never_divides() {
		let mut rate = Rate::direct(RateSource::OnChain, Decimal::ZERO, weth(), usdc());
		rate.is_reverted = true;
		assert_eq!(rate.apply(dec!(5)), Decimal::ZERO);
	}
}
