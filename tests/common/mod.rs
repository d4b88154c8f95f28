//! Shared fixture: a swap stack wired entirely to mocks.

#![allow(dead_code)]

use std::sync::Arc;
use swapflow::mocks::{MockChainClient, MockIntentApi, MockRateAdapter, MockWallet};
use swapflow::{mocks, MemoryStore, Settings, SwapStack, SwapStackBuilder, U256};

pub struct TestStack {
	pub stack: SwapStack,
	pub wallet: Arc<MockWallet>,
	pub chain: Arc<MockChainClient>,
	pub intent_api: Arc<MockIntentApi>,
	pub cross_api: Arc<MockIntentApi>,
	pub store: Arc<MemoryStore>,
}

/// Stack with a connected wallet on mainnet and the given oracle adapters.
pub fn connected_stack(rate_adapters: Vec<Arc<MockRateAdapter>>) -> TestStack {
	let wallet = Arc::new(MockWallet::connected(mocks::alice(), 1));
	let chain = Arc::new(MockChainClient::new());
	let intent_api = Arc::new(MockIntentApi::new());
	let cross_api = Arc::new(MockIntentApi::cross_chain());
	let store = Arc::new(MemoryStore::new());

	let mut builder = SwapStackBuilder::new()
		.with_wallet(wallet.clone())
		.with_chain_client(chain.clone())
		.with_store(store.clone())
		.with_intent_api(intent_api.clone())
		.with_cross_chain_api(cross_api.clone())
		.with_settings(Settings::default());
	for adapter in rate_adapters {
		builder = builder.with_rate_adapter(adapter);
	}

	TestStack {
		stack: builder.build().expect("stack builds"),
		wallet,
		chain,
		intent_api,
		cross_api,
		store,
	}
}

pub fn wei(units: u64, decimals: u32) -> U256 {
	U256::from(units) * U256::from(10u64).pow(U256::from(decimals))
}
