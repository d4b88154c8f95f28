//! Max-amount source
//!
//! The maximum spendable source amount: the wallet's balance of the source
//! token, minus a wrap-fee reserve when the token is native so the user can
//! still afford the deposit gas.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_types::{from_wei, AmountSource, ChainClient, NativeWrap, Side, Wallet};
use tracing::warn;

use crate::pair_holder::PairHolder;

pub struct MaxAmountSource {
	pair: Arc<PairHolder>,
	wallet: Arc<dyn Wallet>,
	chain: Arc<dyn ChainClient>,
	wrap: Arc<dyn NativeWrap>,
}

impl MaxAmountSource {
	pub fn new(
		pair: Arc<PairHolder>,
		wallet: Arc<dyn Wallet>,
		chain: Arc<dyn ChainClient>,
		wrap: Arc<dyn NativeWrap>,
	) -> Self {
		Self {
			pair,
			wallet,
			chain,
			wrap,
		}
	}
}

#[async_trait]
impl AmountSource for MaxAmountSource {
	async fn max_amount(&self) -> Decimal {
		let Some(token) = self.pair.snapshot(Side::Source, false).token else {
			return Decimal::ZERO;
		};
		let Some(wallet_address) = self.wallet.active_address().await else {
			return Decimal::ZERO;
		};

		let balance_wei = match self.chain.token_balance(token.chain_id, &token, wallet_address).await
		{
			Ok(balance) => balance,
			Err(err) => {
				warn!(token = %token.symbol, %err, "balance read failed");
				return Decimal::ZERO;
			}
		};
		let Ok(mut amount) = from_wei(balance_wei, token.decimals) else {
			return Decimal::ZERO;
		};

		if token.is_native() {
			let fee = match self.wrap.estimate_fee(token.chain_id, amount).await {
				Ok(fee) => fee,
				Err(err) => {
					warn!(chain_id = token.chain_id, %err, "wrap fee estimate failed");
					return Decimal::ZERO;
				}
			};
			amount -= fee;
			if amount.is_sign_negative() {
				amount = Decimal::ZERO;
			}
		}

		amount
	}
}
