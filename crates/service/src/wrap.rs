//! Native-asset wrapping
//!
//! Deposits a chain's native asset into its wrapped ERC-20 representation.
//! The deposit fee estimate is block-scoped cached since it only moves with
//! gas prices.

use alloy_primitives::{Bytes, B256, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_storage::BlockCache;
use swapflow_types::{
	from_wei, to_wei, wrapped_native_token, ChainClient, ChainId, NativeWrap, ResolverError,
	TxRequest, Wallet,
};
use tracing::warn;

/// `deposit()`
const DEPOSIT_SELECTOR: [u8; 4] = [0xd0, 0xe3, 0x0d, 0xb0];

const ESTIMATE_KEY: &str = "deposit-estimate";

pub struct NativeWrapResolver {
	chain: Arc<dyn ChainClient>,
	wallet: Arc<dyn Wallet>,
	estimates: Arc<BlockCache<&'static str, Decimal>>,
}

impl NativeWrapResolver {
	pub fn new(chain: Arc<dyn ChainClient>, wallet: Arc<dyn Wallet>) -> Self {
		let estimates = Arc::new(BlockCache::new());
		estimates.attach_ticks(chain.ticks());
		Self {
			chain,
			wallet,
			estimates,
		}
	}

	async fn require_wallet_on(&self, chain_id: ChainId) -> Result<(), ResolverError> {
		let wallet_chain = self.wallet.wallet_chain_id().await;
		if wallet_chain != Some(chain_id) {
			return Err(ResolverError::WrongNetwork { expected: chain_id });
		}
		Ok(())
	}
}

#[async_trait]
impl NativeWrap for NativeWrapResolver {
	async fn can_wrap(&self, chain_id: ChainId, amount: Decimal) -> bool {
		if amount.is_zero() || amount.is_sign_negative() {
			return false;
		}
		match self.estimate_fee(chain_id, amount).await {
			Ok(_) => true,
			Err(err) => {
				warn!(chain_id, %err, "cannot wrap native token");
				false
			}
		}
	}

	async fn estimate_fee(
		&self,
		chain_id: ChainId,
		amount: Decimal,
	) -> Result<Decimal, ResolverError> {
		if let Some(cached) = self.estimates.get(chain_id, &ESTIMATE_KEY) {
			return Ok(cached);
		}

		let wrapped = wrapped_native_token(chain_id).ok_or(ResolverError::CannotWrap {
			reason: format!("chain {chain_id} has no wrapped native token"),
		})?;
		let wallet_address = self
			.wallet
			.active_address()
			.await
			.ok_or(ResolverError::WalletNotConnected)?;
		self.require_wallet_on(chain_id).await?;

		let value = to_wei(amount, wrapped.decimals)?;
		let gas_units = self
			.chain
			.estimate_gas(&TxRequest {
				chain_id,
				from: wallet_address,
				to: wrapped.address,
				data: Bytes::from(DEPOSIT_SELECTOR.to_vec()),
				value,
			})
			.await?;
		let gas_price = self.chain.gas_price(chain_id).await?;

		let fee_wei = gas_units.saturating_mul(gas_price.total_per_gas());
		let fee = from_wei(fee_wei, wrapped.decimals)?;

		self.estimates.set(chain_id, ESTIMATE_KEY, fee);
		Ok(fee)
	}

	async fn wrap(&self, chain_id: ChainId, amount: Decimal) -> Result<B256, ResolverError> {
		if amount.is_zero() || amount.is_sign_negative() {
			return Err(ResolverError::CannotWrap {
				reason: "amount must be greater than zero".into(),
			});
		}
		let wallet_address = self
			.wallet
			.active_address()
			.await
			.ok_or(ResolverError::WalletNotConnected)?;
		let wrapped = wrapped_native_token(chain_id).ok_or(ResolverError::CannotWrap {
			reason: format!("chain {chain_id} has no wrapped native token"),
		})?;
		self.require_wallet_on(chain_id).await?;

		let value = to_wei(amount, wrapped.decimals)?;
		let hash = self
			.wallet
			.send_transaction(TxRequest {
				chain_id,
				from: wallet_address,
				to: wrapped.address,
				data: Bytes::from(DEPOSIT_SELECTOR.to_vec()),
				value,
			})
			.await?;
		self.chain.wait_for_transaction(chain_id, hash).await?;

		Ok(hash)
	}
}
