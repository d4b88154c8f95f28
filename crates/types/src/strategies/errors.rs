//! Error types for strategy operations

use thiserror::Error;

use crate::amount::AmountError;
use crate::chain::ChainError;
use crate::orders::OrderError;
use crate::quotes::QuoteApiError;
use crate::resolver::ResolverError;
use crate::storage::StorageError;
use crate::wallet::WalletError;

pub type StrategyResult<T> = Result<T, StrategyError>;

#[derive(Debug, Error)]
pub enum StrategyError {
	#[error("strategy {strategy} does not support this pair")]
	Unsupported { strategy: String },

	#[error("source amount is zero")]
	ZeroAmount,

	#[error("wallet is not connected")]
	WalletNotConnected,

	#[error("source balance is below the requested amount")]
	InsufficientBalance,

	#[error("no on-chain rate available for the pair")]
	NoRate,

	#[error("venue returned a quote without an id")]
	MissingQuoteId,

	#[error("snapshot belongs to strategy {actual}, expected {expected}")]
	ForeignSnapshot { expected: String, actual: String },

	#[error("operation {operation} is not supported by strategy {strategy}")]
	UnsupportedOperation { operation: String, strategy: String },

	#[error(transparent)]
	Api(#[from] QuoteApiError),

	#[error(transparent)]
	Resolver(#[from] ResolverError),

	#[error(transparent)]
	Order(#[from] OrderError),

	#[error(transparent)]
	Amount(#[from] AmountError),

	#[error(transparent)]
	Chain(#[from] ChainError),

	#[error(transparent)]
	Wallet(#[from] WalletError),

	#[error(transparent)]
	Storage(#[from] StorageError),
}
