//! Swapflow Types
//!
//! Shared models and traits for the swapflow orchestrator.
//! This crate contains all domain models organized by business entity,
//! plus the capability traits the orchestrator consumes (wallet, chain
//! client, quoting venue, persistent key-value storage).

pub mod amount;
pub mod chain;
pub mod orders;
pub mod quotes;
pub mod rates;
pub mod resolver;
pub mod settings;
pub mod snapshots;
pub mod storage;
pub mod strategies;
pub mod tokens;
pub mod wallet;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

// Re-export the arithmetic and EVM primitive types used across all crates
pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use rust_decimal::Decimal;

// Re-export commonly used types for convenience
pub use amount::{from_wei, to_wei, AmountError};

pub use chain::{
	is_native_address, settlement_address, wrapped_native_token, ChainClient, ChainError, ChainId,
	GasPrice, TxRequest, NATIVE_TOKEN_ADDRESS,
};

pub use tokens::{tokens_equal, Side, Token, TokenDirectory, TokenPair, TokenSnapshot};

pub use rates::{Rate, RateError, RateProviding, RateSource, RateSourceAdapter};

pub use snapshots::{SnapshotOptions, StrategySnapshot};

pub use orders::{OrderError, OrderRecord, OrderStatus, OrderStore, SwapOrderStatus};

pub use resolver::{
	NativeWrap, PermitProvider, ResolverActions, ResolverError, ResolverStep,
	TransferRequirements, TransferResolver,
};

pub use strategies::{AmountSource, StrategyError, StrategyResult, SwapStrategy};

pub use wallet::{Wallet, WalletError};

pub use quotes::{
	IntentApi, IntentOrder, IntentOrderPhase, IntentOrderUpdate, IntentQuote, IntentQuoteRequest,
	QuoteApiError,
};

pub use storage::{KeyValueStore, KeyValueStoreExt, StorageError, StorageResult};

pub use settings::SwapSettings;
