//! Pair state holder
//!
//! Owns both sides of the swap form, persists them through the injected
//! key-value store and exposes one replay-latest, value-deduplicated stream
//! per side. Enforces the pair-consistency invariant: the two sides never
//! hold the same asset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use swapflow_types::{
	KeyValueStore, KeyValueStoreExt, Side, Token, TokenSnapshot,
};
use tokio::sync::watch;

use crate::token_context::TokenContext;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSide {
	token: Token,
	amount: Option<Decimal>,
}

struct PairInner {
	source: TokenContext,
	destination: TokenContext,
}

impl PairInner {
	fn side(&self, side: Side) -> &TokenContext {
		match side {
			Side::Source => &self.source,
			Side::Destination => &self.destination,
		}
	}

	fn side_mut(&mut self, side: Side) -> &mut TokenContext {
		match side {
			Side::Source => &mut self.source,
			Side::Destination => &mut self.destination,
		}
	}
}

pub struct PairHolder {
	store: Arc<dyn KeyValueStore>,
	inner: Mutex<PairInner>,
	source_tx: watch::Sender<TokenSnapshot>,
	destination_tx: watch::Sender<TokenSnapshot>,
}

impl PairHolder {
	/// Create the holder and rehydrate both sides from storage. Restore
	/// failures (missing or malformed data) fall back to an empty side.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		let (source_tx, _) = watch::channel(TokenSnapshot::default());
		let (destination_tx, _) = watch::channel(TokenSnapshot::default());
		let holder = Self {
			store,
			inner: Mutex::new(PairInner {
				source: TokenContext::new(),
				destination: TokenContext::new(),
			}),
			source_tx,
			destination_tx,
		};
		holder.restore_pair();
		holder
	}

	fn restore_pair(&self) {
		for side in [Side::Source, Side::Destination] {
			let Some(stored) = self.store.get::<StoredSide>(&side_key(side)) else {
				continue;
			};
			let mut inner = self.inner.lock().expect("pair lock poisoned");
			let ctx = inner.side_mut(side);
			ctx.set_token(Some(stored.token));
			ctx.set_amount(stored.amount.unwrap_or(Decimal::ZERO));
			drop(inner);
			self.publish(side);
		}
	}

	/// Set one side, enforcing pair consistency:
	/// - the incoming token equals the other side -> the pair is switched
	///   instead (no duplicate-token pairs);
	/// - a new source that cannot pair with the current destination
	///   (cross-chain support mismatch, or different chains with neither
	///   side cross-chain capable) clears the destination.
	pub fn set_token(&self, token: Option<Token>, side: Side) {
		if let Some(incoming) = &token {
			let other = self.snapshot(side.other(), false).token;
			if let Some(other) = &other {
				if other.is_same_asset(incoming) {
					return self.switch_pair();
				}
			}
			if side == Side::Source {
				if let Some(destination) = &other {
					let support_mismatch =
						destination.supports_cross_chain != incoming.supports_cross_chain;
					let unreachable_chain = !destination.supports_cross_chain
						&& !incoming.supports_cross_chain
						&& destination.chain_id != incoming.chain_id;
					if support_mismatch || unreachable_chain {
						self.set_token_inner(None, Side::Destination);
					}
				}
			}
		}
		self.set_token_inner(token, side);
	}

	/// Set both sides at once. The destination is cleared instead of set when
	/// it would duplicate the new source.
	pub fn set_pair(&self, source: Option<Token>, destination: Option<Token>) {
		self.set_token_inner(source.clone(), Side::Source);
		let destination = match (&source, destination) {
			(Some(source), Some(destination)) if source.is_same_asset(&destination) => None,
			(_, destination) => destination,
		};
		self.set_token_inner(destination, Side::Destination);
	}

	pub fn set_amount(&self, side: Side, amount: Decimal) {
		let changed = {
			let mut inner = self.inner.lock().expect("pair lock poisoned");
			inner.side_mut(side).set_amount(amount)
		};
		if changed {
			self.persist(side);
			self.publish(side);
		}
	}

	/// Exchange the two sides by reference and notify both streams.
	pub fn switch_pair(&self) {
		{
			let mut inner = self.inner.lock().expect("pair lock poisoned");
			let inner = &mut *inner;
			std::mem::swap(&mut inner.source, &mut inner.destination);
		}
		for side in [Side::Source, Side::Destination] {
			self.persist(side);
			self.publish(side);
		}
	}

	pub fn snapshot(&self, side: Side, convert_wrapped: bool) -> TokenSnapshot {
		self.inner
			.lock()
			.expect("pair lock poisoned")
			.side(side)
			.snapshot(convert_wrapped)
	}

	/// Replay-latest stream of one side's state; value-level duplicates are
	/// suppressed at the publishing end.
	pub fn subscribe(&self, side: Side) -> watch::Receiver<TokenSnapshot> {
		match side {
			Side::Source => self.source_tx.subscribe(),
			Side::Destination => self.destination_tx.subscribe(),
		}
	}

	fn set_token_inner(&self, token: Option<Token>, side: Side) {
		let changed = {
			let mut inner = self.inner.lock().expect("pair lock poisoned");
			inner.side_mut(side).set_token(token)
		};
		if changed {
			self.persist(side);
			self.publish(side);
		}
	}

	fn persist(&self, side: Side) {
		let snapshot = self.snapshot(side, false);
		if let Some(token) = snapshot.token {
			self.store.set(
				&side_key(side),
				&StoredSide {
					token,
					amount: snapshot.amount,
				},
			);
		} else {
			self.store.remove_raw(&side_key(side));
		}
	}

	fn publish(&self, side: Side) {
		let snapshot = self.snapshot(side, false);
		let tx = match side {
			Side::Source => &self.source_tx,
			Side::Destination => &self.destination_tx,
		};
		tx.send_if_modified(|current| {
			if current.value_equals(&snapshot) {
				return false;
			}
			*current = snapshot.clone();
			true
		});
	}
}

fn side_key(side: Side) -> String {
	format!("token_{side}_v2")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;
	use swapflow_storage::MemoryStore;
	use swapflow_types::NATIVE_TOKEN_ADDRESS;

	fn token(symbol: &str, chain_id: u64, address: &str, cross_chain: bool) -> Token {
		Token {
			chain_id,
			address: address.parse().unwrap(),
			symbol: symbol.into(),
			decimals: 18,
			name: symbol.into(),
			supports_cross_chain: cross_chain,
			is_internal_wrap_token: false,
		}
	}

	fn weth() -> Token {
		token("WETH", 1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", true)
	}

	fn usdc() -> Token {
		token("USDC", 1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", true)
	}

	fn holder() -> PairHolder {
		PairHolder::new(Arc::new(MemoryStore::new()))
	}

	#[test]
	fn setting_the_other_sides_token_switches_the_pair() {
		let pair = holder();
		pair.set_pair(Some(weth()), Some(usdc()));

		pair.set_token(Some(usdc()), Side::Source);

		assert_eq!(pair.snapshot(Side::Source, false).token.unwrap().symbol, "USDC");
		assert_eq!(pair.snapshot(Side::Destination, false).token.unwrap().symbol, "WETH");
	}

	#[test]
	fn auto_swap_works_from_the_destination_side() {
		let pair = holder();
		pair.set_pair(Some(weth()), Some(usdc()));

		pair.set_token(Some(weth()), Side::Destination);

		assert_eq!(pair.snapshot(Side::Source, false).token.unwrap().symbol, "USDC");
		assert_eq!(pair.snapshot(Side::Destination, false).token.unwrap().symbol, "WETH");
	}

	#[test]
	fn incompatible_source_clears_destination() {
		let pair = holder();
		let local = token("AAA", 137, "0x1111111111111111111111111111111111111111", false);

		// cross-chain support mismatch with the kept destination
		pair.set_pair(Some(weth()), Some(usdc()));
		pair.set_token(Some(local.clone()), Side::Source);
		assert!(pair.snapshot(Side::Destination, false).token.is_none());

		// different chain while neither side supports cross-chain
		let pinned = token("BBB", 1, "0x2222222222222222222222222222222222222222", false);
		pair.set_pair(Some(weth()), Some(pinned));
		pair.set_token(Some(local), Side::Source);
		assert!(pair.snapshot(Side::Destination, false).token.is_none());
	}

	#[test]
	fn switch_pair_carries_amounts_with_their_tokens() {
		let pair = holder();
		pair.set_pair(Some(weth()), Some(usdc()));
		pair.set_amount(Side::Source, dec!(2));

		pair.switch_pair();

		let destination = pair.snapshot(Side::Destination, false);
		assert_eq!(destination.token.unwrap().symbol, "WETH");
		assert_eq!(destination.amount, Some(dec!(2)));
	}

	#[test]
	fn state_restores_from_storage() {
		let store = Arc::new(MemoryStore::new());
		{
			let pair = PairHolder::new(store.clone());
			pair.set_pair(Some(weth()), Some(usdc()));
			pair.set_amount(Side::Source, dec!(1.5));
		}

		let restored = PairHolder::new(store);
		assert_eq!(restored.snapshot(Side::Source, false).token.unwrap().symbol, "WETH");
		assert_eq!(restored.snapshot(Side::Source, false).amount, Some(dec!(1.5)));
		assert_eq!(restored.snapshot(Side::Destination, false).token.unwrap().symbol, "USDC");
	}

	#[test]
	fn malformed_persisted_state_restores_empty() {
		let store = Arc::new(MemoryStore::new());
		store.set_raw(&side_key(Side::Source), "{broken".into());

		let pair = PairHolder::new(store);
		assert!(pair.snapshot(Side::Source, false).token.is_none());
	}

	#[test]
	fn wrapped_view_is_not_persisted() {
		let store = Arc::new(MemoryStore::new());
		let pair = PairHolder::new(store.clone());
		let eth = Token {
			address: NATIVE_TOKEN_ADDRESS,
			..token("ETH", 1, "0x1111111111111111111111111111111111111111", true)
		};
		pair.set_token(Some(eth), Side::Source);
		pair.set_amount(Side::Source, dec!(1));

		// the wrapped view substitutes WETH...
		assert_eq!(pair.snapshot(Side::Source, true).token.unwrap().symbol, "WETH");

		// ...but persisted state still holds native ETH with its amount
		let stored: StoredSide = store.get(&side_key(Side::Source)).unwrap();
		assert_eq!(stored.token.symbol, "ETH");
		assert_eq!(stored.amount, Some(dec!(1)));
	}

	#[test]
	fn streams_replay_current_state_to_late_subscribers() {
		let pair = holder();
		pair.set_token(Some(weth()), Side::Source);

		let rx = pair.subscribe(Side::Source);
		assert_eq!(rx.borrow().token.as_ref().unwrap().symbol, "WETH");
	}
}
