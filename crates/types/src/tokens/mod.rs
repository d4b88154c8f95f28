//! Token domain model
//!
//! A token is an immutable asset identity pinned to one chain. Identity
//! comparison goes through [`Token::is_same_asset`]; the derived `PartialEq`
//! compares every field and is meant for snapshot/value comparisons only.

use alloy_primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::{is_native_address, ChainId};

/// An ERC-20 style token identity pinned to one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	pub chain_id: ChainId,
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
	pub name: String,
	#[serde(default)]
	pub supports_cross_chain: bool,
	/// Marks a wrapped-native token substituted for the chain's native asset
	/// by the snapshot layer. Never set on tokens the user picked directly.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub is_internal_wrap_token: bool,
}

impl Token {
	/// Same chain and same address.
	///
	/// `Address` equality is byte equality, so differently-cased source
	/// strings compare equal once parsed.
	pub fn is_same_asset(&self, other: &Token) -> bool {
		self.chain_id == other.chain_id && self.address == other.address
	}

	pub fn is_native(&self) -> bool {
		is_native_address(&self.address)
	}
}

/// Asset equality over optional tokens; two absent tokens compare equal.
pub fn tokens_equal(a: Option<&Token>, b: Option<&Token>) -> bool {
	match (a, b) {
		(None, None) => true,
		(Some(a), Some(b)) => a.is_same_asset(b),
		_ => false,
	}
}

/// One side of the swap form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Source,
	Destination,
}

impl Side {
	pub fn other(self) -> Side {
		match self {
			Side::Source => Side::Destination,
			Side::Destination => Side::Source,
		}
	}
}

impl std::fmt::Display for Side {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Side::Source => write!(f, "source"),
			Side::Destination => write!(f, "destination"),
		}
	}
}

/// A fully selected source/destination pair.
///
/// `PairHolder` guarantees the two sides never hold the same asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
	pub source: Token,
	pub destination: Token,
}

/// The observable unit of pair-side state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
	pub token: Option<Token>,
	pub amount: Option<Decimal>,
}

impl TokenSnapshot {
	/// Value equality used for change suppression in snapshot streams.
	///
	/// Partially-filled snapshots never compare equal, so a subscriber always
	/// sees transitions through incomplete states.
	pub fn value_equals(&self, other: &TokenSnapshot) -> bool {
		match (&self.token, &other.token, self.amount, other.amount) {
			(Some(t1), Some(t2), Some(a1), Some(a2)) => t1.is_same_asset(t2) && a1 == a2,
			_ => false,
		}
	}
}

/// Token metadata capability: resolve a token by chain and address.
#[async_trait]
pub trait TokenDirectory: Send + Sync {
	async fn token(&self, chain_id: ChainId, address: Address) -> Option<Token>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn token(chain_id: ChainId, address: &str) -> Token {
		Token {
			chain_id,
			address: address.parse().unwrap(),
			symbol: "TKN".into(),
			decimals: 18,
			name: "Test Token".into(),
			supports_cross_chain: false,
			is_internal_wrap_token: false,
		}
	}

	#[test]
	fn equality_ignores_address_case() {
		let a = token(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
		let b = token(1, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
		assert!(a.is_same_asset(&b));
	}

	#[test]
	fn equality_requires_matching_chain() {
		let a = token(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
		let b = token(137, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
		assert!(!a.is_same_asset(&b));
	}

	#[test]
	fn optional_equality() {
		let a = token(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
		assert!(tokens_equal(None, None));
		assert!(!tokens_equal(Some(&a), None));
		assert!(tokens_equal(Some(&a), Some(&a)));
	}

	#[test]
	fn partial_snapshots_never_compare_equal() {
		let empty = TokenSnapshot::default();
		assert!(!empty.value_equals(&empty));

		let full = TokenSnapshot {
			token: Some(token(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
			amount: Some(Decimal::ONE),
		};
		assert!(full.value_equals(&full.clone()));
		assert!(!full.value_equals(&empty));
	}
}
