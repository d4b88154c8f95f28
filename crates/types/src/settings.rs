//! User-tunable swap parameters
//!
//! `None` means "let the strategy decide" (auto slippage, venue-recommended
//! auction window); a set value overrides the strategy default.

use rust_decimal::Decimal;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct SwapSettings {
	slippage_percent: RwLock<Option<Decimal>>,
	auction_time_secs: RwLock<Option<u64>>,
}

impl SwapSettings {
	pub fn new(slippage_percent: Option<Decimal>, auction_time_secs: Option<u64>) -> Self {
		Self {
			slippage_percent: RwLock::new(slippage_percent),
			auction_time_secs: RwLock::new(auction_time_secs),
		}
	}

	pub fn slippage_percent(&self) -> Option<Decimal> {
		*self.slippage_percent.read().expect("settings lock poisoned")
	}

	pub fn set_slippage_percent(&self, value: Option<Decimal>) {
		*self.slippage_percent.write().expect("settings lock poisoned") = value;
	}

	pub fn auction_time_secs(&self) -> Option<u64> {
		*self.auction_time_secs.read().expect("settings lock poisoned")
	}

	pub fn set_auction_time_secs(&self, value: Option<u64>) {
		*self.auction_time_secs.write().expect("settings lock poisoned") = value;
	}
}
