//! Strategy data snapshot
//!
//! The snapshot is the unit of output of one recomputation pass: everything
//! the consumer needs to render a quote and everything a strategy needs to
//! later execute it.

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rates::Rate;
use crate::tokens::Token;

/// Per-quote execution parameters surfaced alongside the amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotOptions {
	pub rate: Option<Rate>,
	pub slippage_percent: Option<Decimal>,
	pub auction_time_secs: Option<u64>,
	/// Network fee denominated in the chain's native asset; `None` when the
	/// strategy cannot estimate it yet.
	pub network_fee: Option<Decimal>,
	pub min_receive: Option<Decimal>,
}

/// The latest computed quote for a pair/amount, produced by exactly one
/// winning strategy per recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
	pub wallet_address: Option<Address>,
	pub source_token: Token,
	pub destination_token: Token,
	pub source_amount: Decimal,
	pub destination_amount: Decimal,
	pub options: SnapshotOptions,
	pub rate: Rate,
	/// Registry name of the strategy that produced this snapshot; `swap` and
	/// `prepare_swap` dispatch on it.
	pub strategy_name: String,
	/// Raw venue payload the strategy needs to execute the quote, opaque to
	/// the orchestrator.
	pub provider_data: Option<serde_json::Value>,
}
