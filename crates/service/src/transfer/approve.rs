//! ERC-20 approval resolver
//!
//! Checks the current allowance against the required amount; when it falls
//! short, the approval transaction is simulated first (fail fast if it would
//! revert) and a single "Approve" step is returned. The step submits the
//! approval, waits for confirmation and re-reads the allowance, failing if
//! the confirmed value is still not above half the requested amount.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_types::{
	settlement_address, to_wei, ChainClient, ChainId, ResolverActions, ResolverError, ResolverStep,
	Token, TransferResolver, TxRequest, Wallet,
};
use tracing::warn;

/// `approve(address,uint256)`
const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// 160-bit unlimited allowance, compatible with permit-based spenders.
fn max_allowance() -> U256 {
	(U256::from(1u8) << 160) - U256::from(1u8)
}

fn encode_approve(spender: Address, amount: U256) -> Bytes {
	let mut data = Vec::with_capacity(4 + 64);
	data.extend_from_slice(&APPROVE_SELECTOR);
	data.extend_from_slice(&[0u8; 12]);
	data.extend_from_slice(spender.as_slice());
	data.extend_from_slice(&amount.to_be_bytes::<32>());
	Bytes::from(data)
}

pub struct ApprovalResolver {
	chain: Arc<dyn ChainClient>,
	wallet: Arc<dyn Wallet>,
}

impl ApprovalResolver {
	pub fn new(chain: Arc<dyn ChainClient>, wallet: Arc<dyn Wallet>) -> Self {
		Self { chain, wallet }
	}

	async fn check_allowance(
		&self,
		chain_id: ChainId,
		token: &Token,
		owner: Address,
		required: U256,
	) -> bool {
		let Some(spender) = settlement_address(chain_id) else {
			return false;
		};
		match self.chain.allowance(chain_id, token.address, owner, spender).await {
			Ok(allowed) => allowed >= required,
			Err(err) => {
				warn!(token = %token.symbol, %err, "allowance read failed");
				false
			}
		}
	}

	/// Simulate the approval before promising it as a step.
	async fn ensure_approve_executes(
		&self,
		chain_id: ChainId,
		owner: Address,
		token: Address,
		spender: Address,
		amount: U256,
	) -> Result<(), ResolverError> {
		let simulated = TxRequest {
			chain_id,
			from: owner,
			to: token,
			data: encode_approve(spender, amount),
			value: U256::ZERO,
		};
		if let Err(err) = self.chain.estimate_gas(&simulated).await {
			warn!(%err, "approve simulation reverted");
			return Err(ResolverError::ApproveWouldRevert);
		}
		Ok(())
	}
}

#[async_trait]
impl TransferResolver for ApprovalResolver {
	fn name(&self) -> &str {
		"approve"
	}

	async fn requirement_provided(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> bool {
		let Ok(required) = to_wei(amount, token.decimals) else {
			return false;
		};
		!required.is_zero()
			&& self.check_allowance(token.chain_id, token, wallet_address, required).await
	}

	async fn provide_requirements(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> Result<ResolverActions, ResolverError> {
		let chain_id = token.chain_id;
		let required = to_wei(amount, token.decimals)?;
		let spender =
			settlement_address(chain_id).ok_or(ResolverError::NoSupportedProviders)?;

		if self.requirement_provided(wallet_address, token, amount).await {
			return Ok(Vec::new());
		}

		self.ensure_approve_executes(chain_id, wallet_address, token.address, spender, required)
			.await?;

		let chain = Arc::clone(&self.chain);
		let wallet = Arc::clone(&self.wallet);
		let token_address = token.address;
		let step = ResolverStep::new("Approve", async move {
			let wallet_chain = wallet.wallet_chain_id().await;
			if wallet_chain != Some(chain_id) {
				return Err(ResolverError::WrongNetwork { expected: chain_id });
			}

			let hash = wallet
				.send_transaction(TxRequest {
					chain_id,
					from: wallet_address,
					to: token_address,
					data: encode_approve(spender, max_allowance()),
					value: U256::ZERO,
				})
				.await?;
			chain.wait_for_transaction(chain_id, hash).await?;

			// a confirmed approval can still have set an unexpected value,
			// e.g. when racing another approval from the same account
			let confirmed = chain
				.allowance(chain_id, token_address, wallet_address, spender)
				.await?;
			if confirmed <= required / U256::from(2u8) {
				return Err(ResolverError::ConfirmationMismatch);
			}
			Ok(())
		});

		Ok(vec![step])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn approve_calldata_layout() {
		let spender: Address = "0x111111125421cA6dc452d289314280a0f8842A65".parse().unwrap();
		let data = encode_approve(spender, U256::from(7u8));
		assert_eq!(data.len(), 68);
		assert_eq!(&data[..4], &APPROVE_SELECTOR);
		assert_eq!(&data[16..36], spender.as_slice());
		assert_eq!(data[67], 7);
	}

	#[test]
	fn max_allowance_is_160_bits() {
		assert_eq!(max_allowance(), U256::from_str_radix(&"f".repeat(40), 16).unwrap());
	}
}
