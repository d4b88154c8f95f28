//! Permit signature resolver
//!
//! Keeps a short-lived store of signed transfer permits. While a fresh
//! signature exists for (chain, token, wallet) the transfer requirement is
//! considered satisfied without any on-chain action; otherwise a single
//! "Sign permit" step is returned that requests the typed-data signature and
//! caches it. Intent strategies attach the cached permit to quote requests.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use swapflow_storage::LongTermCache;
use swapflow_types::{
	settlement_address, to_wei, KeyValueStore, PermitProvider, ResolverActions, ResolverError,
	ResolverStep, Token, TransferResolver, Wallet,
};
use tracing::warn;

const PERMIT_NAMESPACE: &str = "transfer-permits";
const PERMIT_TTL_DAYS: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPermit {
	signature: Bytes,
	signed_at: DateTime<Utc>,
}

pub struct Permit2Resolver {
	wallet: Arc<dyn Wallet>,
	signatures: Arc<LongTermCache<StoredPermit>>,
}

impl Permit2Resolver {
	pub fn new(wallet: Arc<dyn Wallet>, store: Arc<dyn KeyValueStore>) -> Self {
		Self {
			wallet,
			signatures: Arc::new(LongTermCache::new(store, PERMIT_NAMESPACE, PERMIT_TTL_DAYS)),
		}
	}

	fn permit_key(wallet_address: Address, token: &Token) -> String {
		format!("{}:{}:{}", token.chain_id, token.address, wallet_address)
	}

}

impl PermitProvider for Permit2Resolver {
	/// Fresh cached signature for the pair, if any.
	fn cached_permit(&self, wallet_address: Address, token: &Token) -> Option<Bytes> {
		self.signatures
			.get(&Self::permit_key(wallet_address, token))
			.map(|stored| stored.signature)
	}
}

#[async_trait]
impl TransferResolver for Permit2Resolver {
	fn name(&self) -> &str {
		"permit"
	}

	async fn requirement_provided(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> bool {
		if amount.is_zero() {
			return false;
		}
		self.cached_permit(wallet_address, token).is_some()
	}

	async fn provide_requirements(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> Result<ResolverActions, ResolverError> {
		if self.requirement_provided(wallet_address, token, amount).await {
			return Ok(Vec::new());
		}

		let spender = settlement_address(token.chain_id)
			.ok_or(ResolverError::NoSupportedProviders)?;
		let amount_wei = to_wei(amount, token.decimals)?;

		let wallet = Arc::clone(&self.wallet);
		let signatures = Arc::clone(&self.signatures);
		let token = token.clone();
		let step = ResolverStep::new("Sign permit", async move {
			let payload = json!({
				"domain": { "name": "Permit2", "chainId": token.chain_id },
				"message": {
					"details": {
						"token": token.address,
						"amount": amount_wei.to_string(),
					},
					"spender": spender,
				},
			});
			let signature = match wallet.sign_typed_data(token.chain_id, payload).await {
				Ok(signature) => signature,
				Err(err) => {
					warn!(%err, "permit signing failed");
					return Err(err.into());
				}
			};
			signatures.set(
				Self::permit_key(wallet_address, &token),
				StoredPermit {
					signature,
					signed_at: Utc::now(),
				},
			);
			Ok(())
		});

		Ok(vec![step])
	}
}
