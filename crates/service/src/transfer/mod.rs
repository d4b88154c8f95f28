//! Transfer-requirement resolution
//!
//! Determines and executes the prerequisite on-chain actions for moving a
//! token. A fallback resolver is consulted first through its side-effect-free
//! existence check; otherwise providers are tried in order and the first one
//! that succeeds wins. Exhaustion is fatal: the asset cannot be moved under
//! any known mechanism.

use alloy_primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_types::{ResolverActions, ResolverError, Token, TransferRequirements, TransferResolver};
use tracing::{debug, warn};

mod approve;
mod permit;

pub use approve::ApprovalResolver;
pub use permit::Permit2Resolver;

pub struct TransferRequirementPipeline {
	providers: Vec<Arc<dyn TransferResolver>>,
	fallback: Option<Arc<dyn TransferResolver>>,
}

impl TransferRequirementPipeline {
	pub fn new(
		providers: Vec<Arc<dyn TransferResolver>>,
		fallback: Option<Arc<dyn TransferResolver>>,
	) -> Self {
		Self { providers, fallback }
	}
}

#[async_trait]
impl TransferRequirements for TransferRequirementPipeline {
	async fn provide_requirements(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> Result<ResolverActions, ResolverError> {
		if let Some(fallback) = &self.fallback {
			if fallback.requirement_provided(wallet_address, token, amount).await {
				debug!(
					resolver = fallback.name(),
					token = %token.symbol,
					"transfer requirement already satisfied"
				);
				return Ok(Vec::new());
			}
		}

		for provider in &self.providers {
			match provider.provide_requirements(wallet_address, token, amount).await {
				Ok(actions) => return Ok(actions),
				Err(err) => {
					warn!(provider = provider.name(), %err, "transfer requirement provider failed")
				}
			}
		}

		Err(ResolverError::NoSupportedProviders)
	}
}
