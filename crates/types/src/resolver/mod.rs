//! Transfer-requirement resolution contracts
//!
//! A resolver determines the prerequisite on-chain actions (approval, permit
//! signature, wrapping) a token transfer needs, and hands them back as
//! ordered, human-labeled steps the caller awaits before the swap itself.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use futures::future::BoxFuture;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::amount::AmountError;
use crate::chain::{ChainError, ChainId};
use crate::tokens::Token;
use crate::wallet::WalletError;

#[derive(Debug, Error)]
pub enum ResolverError {
	#[error("no supported providers")]
	NoSupportedProviders,

	#[error("gas estimation failed for approve, transaction would revert")]
	ApproveWouldRevert,

	#[error("confirmed allowance is below the requested amount")]
	ConfirmationMismatch,

	#[error("wallet is not connected")]
	WalletNotConnected,

	#[error("switch the wallet to chain {expected} first")]
	WrongNetwork { expected: ChainId },

	#[error("cannot wrap native token: {reason}")]
	CannotWrap { reason: String },

	#[error(transparent)]
	Chain(#[from] ChainError),

	#[error(transparent)]
	Wallet(#[from] WalletError),

	#[error(transparent)]
	Amount(#[from] AmountError),
}

/// An ordered, labeled deferred action. The future runs once, when the caller
/// awaits the step.
pub struct ResolverStep {
	alias: String,
	action: BoxFuture<'static, Result<(), ResolverError>>,
}

impl ResolverStep {
	pub fn new(
		alias: impl Into<String>,
		action: impl std::future::Future<Output = Result<(), ResolverError>> + Send + 'static,
	) -> Self {
		Self {
			alias: alias.into(),
			action: Box::pin(action),
		}
	}

	/// Human-readable label, e.g. "Approve".
	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub async fn wait(self) -> Result<(), ResolverError> {
		self.action.await
	}
}

impl std::fmt::Debug for ResolverStep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResolverStep").field("alias", &self.alias).finish_non_exhaustive()
	}
}

pub type ResolverActions = Vec<ResolverStep>;

/// One mechanism for satisfying a transfer requirement (approval, permit, ...).
#[async_trait]
pub trait TransferResolver: Send + Sync {
	fn name(&self) -> &str;

	/// Pure existence check: is the requirement already satisfied? Must not
	/// mutate any on-chain or persisted state.
	async fn requirement_provided(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> bool;

	/// Steps that will satisfy the requirement, or an error when this
	/// mechanism cannot handle the asset.
	async fn provide_requirements(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> Result<ResolverActions, ResolverError>;
}

/// The composed resolver strategies call into.
#[async_trait]
pub trait TransferRequirements: Send + Sync {
	async fn provide_requirements(
		&self,
		wallet_address: Address,
		token: &Token,
		amount: Decimal,
	) -> Result<ResolverActions, ResolverError>;
}

/// Read-side access to cached transfer permits, used by strategies to attach
/// an existing signature to quote requests.
pub trait PermitProvider: Send + Sync {
	fn cached_permit(&self, wallet_address: Address, token: &Token) -> Option<crate::Bytes>;
}

/// Wrapping a chain's native asset into its ERC-20 representation.
#[async_trait]
pub trait NativeWrap: Send + Sync {
	async fn can_wrap(&self, chain_id: ChainId, amount: Decimal) -> bool;

	/// Network fee of the deposit, denominated in the native asset.
	async fn estimate_fee(&self, chain_id: ChainId, amount: Decimal)
		-> Result<Decimal, ResolverError>;

	/// Submit the deposit and wait for confirmation.
	async fn wrap(&self, chain_id: ChainId, amount: Decimal) -> Result<B256, ResolverError>;
}
