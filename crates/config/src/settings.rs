//! Configuration settings structures

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swapflow_types::SwapSettings;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
	pub pipeline: PipelineSettings,
	pub orders: OrderSettings,
	pub swap: SwapDefaults,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			pipeline: PipelineSettings::default(),
			orders: OrderSettings::default(),
			swap: SwapDefaults::default(),
		}
	}
}

/// Recomputation pipeline tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineSettings {
	/// Quiet window applied to chain tick triggers before re-quoting.
	pub tick_debounce_ms: u64,
}

impl Default for PipelineSettings {
	fn default() -> Self {
		Self {
			tick_debounce_ms: 1_000,
		}
	}
}

/// Order repository tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OrderSettings {
	pub ttl_days: i64,
	pub sweep_window_hours: i64,
}

impl Default for OrderSettings {
	fn default() -> Self {
		Self {
			ttl_days: 3,
			sweep_window_hours: 12,
		}
	}
}

/// Initial user-facing swap parameters; `None` keeps venue-recommended
/// values.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SwapDefaults {
	pub slippage_percent: Option<Decimal>,
	pub auction_time_secs: Option<u64>,
}

impl SwapDefaults {
	pub fn into_swap_settings(self) -> SwapSettings {
		SwapSettings::new(self.slippage_percent, self.auction_time_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_product_values() {
		let settings = Settings::default();
		assert_eq!(settings.pipeline.tick_debounce_ms, 1_000);
		assert_eq!(settings.orders.ttl_days, 3);
		assert!(settings.swap.slippage_percent.is_none());
	}
}
