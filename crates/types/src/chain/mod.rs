//! Chain registry and the on-chain capability contract
//!
//! The registry is static data: which chains the orchestrator knows, their
//! wrapped-native tokens and the settlement contract approvals are granted to.

mod client;

pub use client::{ChainClient, ChainError, GasPrice, TxRequest};

use alloy_primitives::{address, Address};

use crate::tokens::Token;

/// EVM chain identifier.
pub type ChainId = u64;

/// Sentinel address wallets and quoting venues use for a chain's native asset.
pub const NATIVE_TOKEN_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Settlement router granted token approvals; same deployment on every
/// supported chain.
const SETTLEMENT_ADDRESS: Address = address!("111111125421cA6dc452d289314280a0f8842A65");

pub fn is_native_address(address: &Address) -> bool {
	*address == NATIVE_TOKEN_ADDRESS
}

/// Settlement contract for a chain, `None` when the chain is unknown.
pub fn settlement_address(chain_id: ChainId) -> Option<Address> {
	wrapped_native_address(chain_id).map(|_| SETTLEMENT_ADDRESS)
}

fn wrapped_native_address(chain_id: ChainId) -> Option<Address> {
	let address = match chain_id {
		1 => address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
		10 => address!("4200000000000000000000000000000000000006"),
		56 => address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
		100 => address!("e91D153E0b41518A2Ce8Dd3D7944Fa863463a97d"),
		137 => address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
		8453 => address!("4200000000000000000000000000000000000006"),
		42161 => address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
		43114 => address!("B31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
		_ => return None,
	};
	Some(address)
}

/// The ERC-20 representation of a chain's native asset, flagged as an
/// internal wrap stand-in so downstream consumers can tell it apart from a
/// wrapped token the user picked directly.
pub fn wrapped_native_token(chain_id: ChainId) -> Option<Token> {
	let address = wrapped_native_address(chain_id)?;
	let (symbol, name) = match chain_id {
		56 => ("WBNB", "Wrapped BNB"),
		100 => ("WXDAI", "Wrapped XDAI"),
		137 => ("WMATIC", "Wrapped Matic"),
		43114 => ("WAVAX", "Wrapped AVAX"),
		_ => ("WETH", "Wrapped Ether"),
	};
	Some(Token {
		chain_id,
		address,
		symbol: symbol.into(),
		decimals: 18,
		name: name.into(),
		supports_cross_chain: true,
		is_internal_wrap_token: true,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wrapped_native_is_flagged_as_internal() {
		let weth = wrapped_native_token(1).unwrap();
		assert!(weth.is_internal_wrap_token);
		assert_eq!(weth.symbol, "WETH");
		assert_eq!(weth.decimals, 18);
	}

	#[test]
	fn unknown_chain_has_no_wrapped_native() {
		assert!(wrapped_native_token(123_456).is_none());
		assert!(settlement_address(123_456).is_none());
	}

	#[test]
	fn native_sentinel_roundtrip() {
		assert!(is_native_address(&NATIVE_TOKEN_ADDRESS));
		assert!(!is_native_address(&SETTLEMENT_ADDRESS));
	}
}
