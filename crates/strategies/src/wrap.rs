//! Native-wrap strategy
//!
//! Handles the one pair no venue quotes: the native asset (substituted as the
//! internal wrap stand-in) into the chain's real wrapped-native token. The
//! exchange is always 1:1; the only cost is the deposit gas.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_storage::SingleFlight;
use swapflow_types::{
	wrapped_native_token, Address, ChainId, NativeWrap, Rate, RateSource, ResolverActions,
	SnapshotOptions, StrategyError, StrategyResult, StrategySnapshot, SwapStrategy, TokenPair,
	B256,
};
use tracing::warn;

pub const WRAP_STRATEGY_NAME: &str = "native-wrap";

pub struct WrapStrategy {
	wrap: Arc<dyn NativeWrap>,
	estimate_flight: SingleFlight<String, Option<Decimal>>,
}

impl WrapStrategy {
	pub fn new(wrap: Arc<dyn NativeWrap>) -> Self {
		Self {
			wrap,
			estimate_flight: SingleFlight::new(),
		}
	}

	/// Deposit fee estimate; failures degrade to `None` so a quote can still
	/// be shown without a fee figure.
	async fn estimate_deposit(&self, chain_id: ChainId, amount: Decimal) -> Option<Decimal> {
		let wrap = Arc::clone(&self.wrap);
		self.estimate_flight
			.run(format!("{chain_id}:{amount}"), move || async move {
				match wrap.estimate_fee(chain_id, amount).await {
					Ok(fee) => Some(fee),
					Err(err) => {
						warn!(chain_id, %err, "deposit estimate failed");
						None
					}
				}
			})
			.await
	}
}

#[async_trait]
impl SwapStrategy for WrapStrategy {
	fn name(&self) -> &str {
		WRAP_STRATEGY_NAME
	}

	async fn supports(&self, pair: &TokenPair, _wallet_address: Option<Address>) -> bool {
		pair.source.chain_id == pair.destination.chain_id
			&& pair.source.is_internal_wrap_token
			&& wrapped_native_token(pair.source.chain_id)
				.is_some_and(|wrapped| wrapped.address == pair.destination.address)
	}

	async fn quote(
		&self,
		pair: &TokenPair,
		amount: Decimal,
		wallet_address: Option<Address>,
		_finalize: bool,
	) -> StrategyResult<StrategySnapshot> {
		if !self.supports(pair, wallet_address).await {
			return Err(StrategyError::Unsupported {
				strategy: self.name().into(),
			});
		}

		let rate = Rate {
			source: RateSource::Deposit,
			is_reverted: false,
			rate: Decimal::ONE,
			reverted_rate: Decimal::ONE,
			source_token: pair.source.clone(),
			destination_token: pair.destination.clone(),
		};

		let network_fee = self.estimate_deposit(pair.source.chain_id, amount).await;

		Ok(StrategySnapshot {
			wallet_address,
			source_token: pair.source.clone(),
			destination_token: pair.destination.clone(),
			source_amount: amount,
			destination_amount: amount,
			options: SnapshotOptions {
				rate: Some(rate.clone()),
				min_receive: Some(amount),
				network_fee,
				..SnapshotOptions::default()
			},
			rate,
			strategy_name: self.name().into(),
			provider_data: None,
		})
	}

	async fn swap(&self, snapshot: &StrategySnapshot) -> StrategyResult<B256> {
		if snapshot.strategy_name != self.name() {
			return Err(StrategyError::ForeignSnapshot {
				expected: self.name().into(),
				actual: snapshot.strategy_name.clone(),
			});
		}

		let chain_id = snapshot.source_token.chain_id;
		let amount = snapshot.destination_amount;
		if !self.wrap.can_wrap(chain_id, amount).await {
			return Err(StrategyError::Resolver(
				swapflow_types::ResolverError::CannotWrap {
					reason: "wrap precheck failed".into(),
				},
			));
		}

		Ok(self.wrap.wrap(chain_id, amount).await?)
	}

	async fn prepare_swap(&self, _snapshot: &StrategySnapshot) -> StrategyResult<ResolverActions> {
		Ok(Vec::new())
	}
}
