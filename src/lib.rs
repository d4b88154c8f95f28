//! Swapflow
//!
//! A client-side currency-swap quoting and execution orchestrator. Selects a
//! best-available strategy per pair, keeps a live quote synchronized with
//! wallet, chain and user input changes, resolves the on-chain preparation
//! steps a swap needs, and tracks submitted orders.
//!
//! The [`SwapStackBuilder`] wires the injected capabilities (wallet, chain
//! client, key-value storage, quoting venues) into a running [`SwapContext`].

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// Core domain types - the most commonly used types
pub use swapflow_types::{
	chrono,
	// External dependencies for convenience
	serde_json,
	Address,
	AmountError,
	Bytes,
	ChainClient,
	ChainError,
	ChainId,
	Decimal,
	IntentApi,
	IntentQuote,
	IntentQuoteRequest,
	KeyValueStore,
	OrderError,
	OrderRecord,
	OrderStatus,
	OrderStore,
	Rate,
	RateProviding,
	RateSource,
	RateSourceAdapter,
	ResolverActions,
	ResolverStep,
	Side,
	StrategyError,
	StrategySnapshot,
	SwapOrderStatus,
	SwapSettings,
	SwapStrategy,
	Token,
	TokenPair,
	TokenSnapshot,
	Wallet,
	B256,
	U256,
};

// Service layer
pub use swapflow_service::{
	ApprovalResolver, ContextError, MaxAmountSource, NativeWrapResolver, OrderBook, PairHolder,
	Permit2Resolver, RateProvider, SwapContext, TransferRequirementPipeline,
};

// Storage layer
pub use swapflow_storage::{
	Batcher, BlockCache, LongTermCache, MemoryStore, SingleFlight, TtlGuard,
};

// Strategies
pub use swapflow_strategies::{
	default_strategies, IntentKind, IntentStrategy, SpotStrategy, WrapStrategy,
};

// Config
pub use swapflow_config::{load_config, Settings};

// Module aliases for direct access to the member crates
pub mod types {
	pub use swapflow_types::*;
}

pub mod storage {
	pub use swapflow_storage::*;
}

pub mod service {
	pub use swapflow_service::*;
}

pub mod strategies {
	pub use swapflow_strategies::*;
}

pub mod config {
	pub use swapflow_config::*;
}

pub mod mocks;

#[derive(Debug, Error)]
pub enum BuildError {
	#[error("missing required capability: {0}")]
	MissingCapability(&'static str),
}

/// The assembled orchestration stack.
pub struct SwapStack {
	pub context: Arc<SwapContext>,
	pub pair: Arc<PairHolder>,
	pub orders: Arc<OrderBook>,
	pub rates: Arc<RateProvider>,
	pub settings: Arc<SwapSettings>,
}

/// Wires capabilities into a running swap context.
///
/// Every dependency is an explicit instance handed to the builder; nothing is
/// reached through global state. `build` must run inside a tokio runtime
/// since it starts the recomputation pipeline and the cache tick listeners.
#[derive(Default)]
pub struct SwapStackBuilder {
	wallet: Option<Arc<dyn Wallet>>,
	chain: Option<Arc<dyn ChainClient>>,
	store: Option<Arc<dyn KeyValueStore>>,
	single_chain_api: Option<Arc<dyn IntentApi>>,
	cross_chain_api: Option<Arc<dyn IntentApi>>,
	rate_adapters: Vec<Arc<dyn RateSourceAdapter>>,
	directory: Option<Arc<dyn types::TokenDirectory>>,
	settings: Settings,
}

impl SwapStackBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder pre-loaded with the file/env configuration; falls back to
	/// defaults when no configuration is present.
	pub fn from_config() -> Self {
		Self {
			settings: load_config().unwrap_or_else(|err| {
				tracing::warn!(%err, "failed to load configuration, using defaults");
				Settings::default()
			}),
			..Self::default()
		}
	}

	pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
		self.wallet = Some(wallet);
		self
	}

	pub fn with_chain_client(mut self, chain: Arc<dyn ChainClient>) -> Self {
		self.chain = Some(chain);
		self
	}

	pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
		self.store = Some(store);
		self
	}

	pub fn with_intent_api(mut self, api: Arc<dyn IntentApi>) -> Self {
		self.single_chain_api = Some(api);
		self
	}

	pub fn with_cross_chain_api(mut self, api: Arc<dyn IntentApi>) -> Self {
		self.cross_chain_api = Some(api);
		self
	}

	pub fn with_rate_adapter(mut self, adapter: Arc<dyn RateSourceAdapter>) -> Self {
		self.rate_adapters.push(adapter);
		self
	}

	pub fn with_token_directory(mut self, directory: Arc<dyn types::TokenDirectory>) -> Self {
		self.directory = Some(directory);
		self
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	pub fn build(self) -> Result<SwapStack, BuildError> {
		let wallet = self.wallet.ok_or(BuildError::MissingCapability("wallet"))?;
		let chain = self.chain.ok_or(BuildError::MissingCapability("chain client"))?;
		let store = self.store.ok_or(BuildError::MissingCapability("key-value store"))?;
		let single_chain_api = self
			.single_chain_api
			.ok_or(BuildError::MissingCapability("intent api"))?;
		let cross_chain_api = self.cross_chain_api.unwrap_or_else(|| Arc::clone(&single_chain_api));

		let pair = Arc::new(PairHolder::new(Arc::clone(&store)));
		let orders = Arc::new(OrderBook::with_ttl(
			Arc::clone(&store),
			self.settings.orders.ttl_days,
			self.settings.orders.sweep_window_hours,
		));
		let rates = Arc::new(RateProvider::new(self.rate_adapters, chain.as_ref()));
		let wrap = Arc::new(NativeWrapResolver::new(Arc::clone(&chain), Arc::clone(&wallet)));
		let amounts = Arc::new(MaxAmountSource::new(
			Arc::clone(&pair),
			Arc::clone(&wallet),
			Arc::clone(&chain),
			wrap.clone() as Arc<dyn types::NativeWrap>,
		));
		let permits = Arc::new(Permit2Resolver::new(Arc::clone(&wallet), Arc::clone(&store)));
		let approval = Arc::new(ApprovalResolver::new(Arc::clone(&chain), Arc::clone(&wallet)));
		let providers: Vec<Arc<dyn types::TransferResolver>> = vec![approval];
		let requirements = Arc::new(TransferRequirementPipeline::new(
			providers,
			Some(permits.clone() as Arc<dyn types::TransferResolver>),
		));
		let settings = Arc::new(self.settings.swap.clone().into_swap_settings());

		let strategies = default_strategies(
			single_chain_api,
			cross_chain_api,
			Arc::clone(&wallet),
			orders.clone() as Arc<dyn OrderStore>,
			amounts.clone() as Arc<dyn types::AmountSource>,
			Arc::clone(&settings),
			requirements,
			wrap,
			rates.clone() as Arc<dyn RateProviding>,
			Some(permits as Arc<dyn types::PermitProvider>),
		);

		let context = SwapContext::new(
			wallet,
			chain,
			Arc::clone(&pair),
			strategies,
			orders.clone() as Arc<dyn OrderStore>,
			amounts,
			self.directory,
			Duration::from_millis(self.settings.pipeline.tick_debounce_ms),
		);
		context.start();

		Ok(SwapStack {
			context,
			pair,
			orders,
			rates,
			settings,
		})
	}
}
