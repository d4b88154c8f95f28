//! Swapflow Strategies
//!
//! Concrete [`SwapStrategy`] implementations, one per swap protocol variant,
//! plus the factory that assembles them into the ordered registry the
//! orchestrator resolves against.

use std::sync::Arc;

use indexmap::IndexMap;
use swapflow_types::{
	AmountSource, IntentApi, NativeWrap, OrderStore, PermitProvider, RateProviding, SwapSettings,
	SwapStrategy, TransferRequirements,
};

pub mod intent;
pub mod spot;
pub mod wrap;

pub use intent::{IntentKind, IntentStrategy};
pub use spot::SpotStrategy;
pub use wrap::WrapStrategy;

/// Registry order is resolution priority: the wrap shortcut first, then the
/// cross-chain and single-chain auction venues, with the display-only spot
/// quote as the last resort. First strategy whose quote succeeds wins.
#[allow(clippy::too_many_arguments)]
pub fn default_strategies(
	single_chain_api: Arc<dyn IntentApi>,
	cross_chain_api: Arc<dyn IntentApi>,
	wallet: Arc<dyn swapflow_types::Wallet>,
	orders: Arc<dyn OrderStore>,
	amounts: Arc<dyn AmountSource>,
	settings: Arc<SwapSettings>,
	requirements: Arc<dyn TransferRequirements>,
	wrap_resolver: Arc<dyn NativeWrap>,
	rates: Arc<dyn RateProviding>,
	permits: Option<Arc<dyn PermitProvider>>,
) -> IndexMap<String, Arc<dyn SwapStrategy>> {
	let wrap = Arc::new(WrapStrategy::new(Arc::clone(&wrap_resolver)));
	let cross_chain = Arc::new(IntentStrategy::new(
		IntentKind::CrossChain,
		cross_chain_api,
		Arc::clone(&wallet),
		Arc::clone(&orders),
		Arc::clone(&amounts),
		Arc::clone(&settings),
		Arc::clone(&requirements),
		Arc::clone(&wrap_resolver),
		permits.clone(),
	));
	let intent = Arc::new(IntentStrategy::new(
		IntentKind::SingleChain,
		single_chain_api,
		wallet,
		orders,
		amounts,
		settings,
		requirements,
		wrap_resolver,
		permits,
	));
	let spot = Arc::new(SpotStrategy::new(rates));

	let mut strategies: IndexMap<String, Arc<dyn SwapStrategy>> = IndexMap::new();
	for strategy in [
		wrap as Arc<dyn SwapStrategy>,
		cross_chain,
		intent,
		spot,
	] {
		strategies.insert(strategy.name().to_string(), strategy);
	}
	strategies
}
