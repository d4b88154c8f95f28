//! On-chain rate aggregation
//!
//! Aggregates N oracle adapters, each scoped to a subset of chains. Native
//! tokens are substituted with the chain's wrapped-native token before
//! lookup; raw results are block-scoped cached under the ordered address
//! pair, and concurrent lookups for the same pair coalesce.

use futures::future::join_all;
use std::sync::Arc;
use swapflow_storage::{BlockCache, SingleFlight};
use swapflow_types::{
	wrapped_native_token, ChainClient, ChainId, Rate, RateProviding, RateSourceAdapter, Token,
};
use async_trait::async_trait;
use tracing::warn;

pub struct RateProvider {
	adapters: Vec<Arc<dyn RateSourceAdapter>>,
	cache: Arc<BlockCache<String, Vec<Rate>>>,
	flight: SingleFlight<String, Option<Rate>>,
}

impl RateProvider {
	pub fn new(adapters: Vec<Arc<dyn RateSourceAdapter>>, chain: &dyn ChainClient) -> Self {
		let cache = Arc::new(BlockCache::new());
		cache.attach_ticks(chain.ticks());
		Self {
			adapters,
			cache,
			flight: SingleFlight::new(),
		}
	}
}

#[async_trait]
impl RateProviding for RateProvider {
	async fn on_chain_rate(
		&self,
		chain_id: ChainId,
		source: &Token,
		destination: &Token,
	) -> Option<Rate> {
		let key = format!("{chain_id}:{}:{}", source.address, destination.address);
		let adapters = self.adapters.clone();
		let cache = Arc::clone(&self.cache);
		let source = source.clone();
		let destination = destination.clone();
		self.flight
			.run(key, move || best_rate(adapters, cache, chain_id, source, destination))
			.await
	}
}

/// Among surviving adapter results, the rate with the numerically largest
/// orientation-aware value wins; ties keep the earliest adapter's result.
async fn best_rate(
	adapters: Vec<Arc<dyn RateSourceAdapter>>,
	cache: Arc<BlockCache<String, Vec<Rate>>>,
	chain_id: ChainId,
	source: Token,
	destination: Token,
) -> Option<Rate> {
	let rates = raw_rates(adapters, cache, chain_id, source, destination).await;
	let mut best: Option<Rate> = None;
	for rate in rates {
		match &best {
			Some(current) if rate.effective() <= current.effective() => {}
			_ => best = Some(rate),
		}
	}
	best.filter(|rate| !rate.effective().is_zero() && !rate.effective().is_sign_negative())
}

async fn raw_rates(
	adapters: Vec<Arc<dyn RateSourceAdapter>>,
	cache: Arc<BlockCache<String, Vec<Rate>>>,
	chain_id: ChainId,
	source: Token,
	destination: Token,
) -> Vec<Rate> {
	// price lookups cannot handle native assets directly
	let source = match substitute_native(chain_id, source) {
		Some(token) => token,
		None => return Vec::new(),
	};
	let destination = match substitute_native(chain_id, destination) {
		Some(token) => token,
		None => return Vec::new(),
	};

	let key = format!("{}:{}", source.address, destination.address);
	if let Some(cached) = cache.get(chain_id, &key) {
		return cached;
	}

	let supported: Vec<_> = adapters
		.iter()
		.filter(|adapter| adapter.supports_chain(chain_id))
		.collect();
	let results = join_all(supported.iter().map(|adapter| {
		let source = source.clone();
		let destination = destination.clone();
		async move {
			(
				adapter.name().to_string(),
				adapter.rate(chain_id, &source, &destination).await,
			)
		}
	}))
	.await;

	let rates: Vec<Rate> = results
		.into_iter()
		.filter_map(|(name, result)| match result {
			Ok(rate) => Some(rate),
			Err(err) => {
				// one bad oracle must not fail the overall computation
				warn!(adapter = %name, %err, "rate adapter failed");
				None
			}
		})
		.collect();

	cache.set(chain_id, key, rates.clone());
	rates
}

fn substitute_native(chain_id: ChainId, token: Token) -> Option<Token> {
	if token.is_native() {
		wrapped_native_token(chain_id)
	} else {
		Some(token)
	}
}
