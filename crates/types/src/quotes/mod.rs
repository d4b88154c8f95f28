//! Intent-quoting venue capability
//!
//! The abstract contract of an auction-based quoting/execution backend. Wire
//! formats are owned by the implementing adapter; the orchestrator only sees
//! these shapes.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainId;

#[derive(Debug, Error)]
pub enum QuoteApiError {
	#[error("pair is not supported by this venue")]
	UnsupportedPair,

	#[error("no liquidity for the requested amount")]
	NoLiquidity,

	#[error("quote {quote_id} was rejected: {reason}")]
	Rejected { quote_id: String, reason: String },

	#[error("order {hash} is unknown to the venue")]
	UnknownOrder { hash: B256 },

	#[error("venue transport error: {0}")]
	Transport(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentQuoteRequest {
	pub wallet_address: Address,
	pub src_chain_id: ChainId,
	pub dst_chain_id: ChainId,
	pub src_token: Address,
	pub dst_token: Address,
	pub amount_wei: U256,
	/// Pre-signed permit attached when the wallet already granted one.
	pub permit: Option<Bytes>,
	/// Ask the venue for an executable (rather than indicative) quote.
	pub enable_estimate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentQuote {
	pub quote_id: String,
	pub dst_amount_wei: U256,
	/// Worst-case fill at the end of the auction curve.
	pub auction_end_amount_wei: U256,
	pub auction_duration_secs: u64,
	pub auto_slippage_percent: Decimal,
	pub recommended_preset: String,
	/// Venue payload echoed back on submission.
	pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOrder {
	pub quote_id: String,
	pub wallet_address: Address,
	pub src_token: Address,
	pub dst_token: Address,
	pub amount_wei: U256,
	pub preset: String,
}

/// Venue-level order phase, mapped to the domain [`crate::OrderStatus`] by
/// the owning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentOrderPhase {
	Pending,
	PartiallyFilled,
	Filled,
	Expired,
	Cancelled,
	/// Cross-chain fills that missed their window unwind through a refund.
	Refunding,
	Refunded,
	Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOrderUpdate {
	pub phase: IntentOrderPhase,
	pub making_amount_wei: U256,
	pub taking_amount_wei: U256,
	pub auction_duration_secs: u64,
	pub auction_start: Option<DateTime<Utc>>,
	/// Set once a cancel transaction is known to the venue.
	pub cancel_tx: Option<B256>,
}

#[async_trait]
pub trait IntentApi: Send + Sync {
	fn supports(&self, src_chain_id: ChainId, dst_chain_id: ChainId) -> bool;

	async fn quote(&self, request: &IntentQuoteRequest) -> Result<IntentQuote, QuoteApiError>;

	/// Submit an order built from a previously returned quote; returns the
	/// order hash used for all later tracking.
	async fn submit_order(&self, order: &IntentOrder) -> Result<B256, QuoteApiError>;

	async fn order_status(&self, hash: B256) -> Result<IntentOrderUpdate, QuoteApiError>;

	/// Calldata for an on-chain cancellation, submitted through the wallet to
	/// the settlement contract.
	async fn cancel_calldata(&self, hash: B256) -> Result<Bytes, QuoteApiError>;
}
