//! End-to-end tests of the swap context pipeline over mocks.

mod common;

use common::{connected_stack, wei};
use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use swapflow::mocks::{
	alice, dai, eth, weth, MockChainClient, MockIntentApi, MockRateAdapter, MockTokenDirectory,
	MockWallet,
};
use swapflow::{ContextError, KeyValueStore, MemoryStore, Side, SwapStackBuilder};

#[tokio::test]
async fn first_supporting_strategy_wins() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1.5));

	let snapshot = t.stack.context.get_snapshot(false).await.expect("quote available");

	assert_eq!(snapshot.strategy_name, "intent-auction");
	assert_eq!(snapshot.source_amount, dec!(1.5));
	assert_eq!(snapshot.destination_amount, dec!(3));
	assert_eq!(snapshot.rate.rate, dec!(2));
}

#[tokio::test]
async fn fallback_continues_past_failing_strategies() {
	let oracle = Arc::new(MockRateAdapter::with_rate("oracle", vec![1], dec!(2000)));
	let t = connected_stack(vec![oracle]);
	t.intent_api.fail_quotes.store(true, Ordering::SeqCst);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	let snapshot = t.stack.context.get_snapshot(false).await.expect("spot quote");

	assert_eq!(snapshot.strategy_name, "spot");
	assert_eq!(snapshot.destination_amount, dec!(2000));
	// the failing venue was actually consulted first
	assert!(t.intent_api.quote_calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn exhausted_strategies_publish_no_quote_instead_of_an_error() {
	let t = connected_stack(vec![]);
	t.intent_api.fail_quotes.store(true, Ordering::SeqCst);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	assert!(t.stack.context.get_snapshot(false).await.is_none());
	assert!(t.stack.context.snapshot_stream().borrow().is_none());
}

#[tokio::test]
async fn native_source_is_quoted_as_wrapped_but_persisted_as_native() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, eth(1).address, alice(), wei(5, 18));
	t.stack.context.set_pair(Some(eth(1)), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	let snapshot = t.stack.context.get_snapshot(false).await.expect("quote available");

	assert_eq!(snapshot.strategy_name, "intent-auction");
	assert_eq!(snapshot.source_token.symbol, "WETH");
	assert!(snapshot.source_token.is_internal_wrap_token);

	let stored: serde_json::Value =
		serde_json::from_str(&t.store.get_raw("token_source_v2").expect("persisted side"))
			.expect("valid json");
	assert_eq!(stored["token"]["symbol"], "ETH");
	assert_eq!(stored["amount"], "1");
}

#[tokio::test]
async fn native_to_wrapped_pair_uses_the_wrap_strategy() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, eth(1).address, alice(), wei(5, 18));
	t.stack.context.set_pair(Some(eth(1)), Some(weth()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	let snapshot = t.stack.context.get_snapshot(false).await.expect("wrap quote");

	assert_eq!(snapshot.strategy_name, "native-wrap");
	assert_eq!(snapshot.destination_amount, dec!(1));
	assert_eq!(snapshot.rate.rate, dec!(1));
	// deposit gas: 50_000 units at 21 gwei
	assert_eq!(snapshot.options.network_fee, Some(dec!(0.00105)));
}

#[tokio::test]
async fn snapshot_reflects_state_as_of_the_call() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));
	t.stack.context.get_snapshot(false).await.expect("warm-up quote");

	t.stack.context.set_amount(Side::Source, dec!(2));
	let snapshot = t.stack.context.get_snapshot(false).await.expect("fresh quote");

	assert_eq!(snapshot.source_amount, dec!(2));
	assert_eq!(snapshot.destination_amount, dec!(4));
}

#[tokio::test]
async fn destination_amount_feeds_back_into_the_pair() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1.5));

	let snapshot = t.stack.context.get_snapshot(false).await.expect("quote available");

	let destination = t.stack.pair.snapshot(Side::Destination, false);
	assert_eq!(destination.amount, Some(snapshot.destination_amount));
	assert!(!*t.stack.context.loading_stream().borrow());
}

#[tokio::test]
async fn finalize_bypasses_the_cached_pipeline_value() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	t.stack.context.get_snapshot(false).await.expect("preview quote");
	let preview_request = t.intent_api.last_request.lock().unwrap().clone().unwrap();
	assert!(!preview_request.enable_estimate);

	t.stack.context.get_snapshot(true).await.expect("final quote");
	let final_request = t.intent_api.last_request.lock().unwrap().clone().unwrap();
	assert!(final_request.enable_estimate);
}

#[tokio::test]
async fn unknown_strategy_reference_is_a_hard_error() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	let mut snapshot = t.stack.context.get_snapshot(false).await.expect("quote available");
	snapshot.strategy_name = "bogus".into();

	match t.stack.context.swap(&snapshot).await {
		Err(ContextError::UnknownStrategy { name }) => assert_eq!(name, "bogus"),
		other => panic!("expected UnknownStrategy, got {other:?}"),
	}
}

#[tokio::test]
async fn disconnected_wallet_yields_no_quote_without_a_spot_rate() {
	let t = connected_stack(vec![]);
	t.wallet.disconnect();
	t.stack.context.set_pair(Some(weth()), Some(dai()));
	t.stack.context.set_amount(Side::Source, dec!(1));

	assert!(t.stack.context.get_snapshot(false).await.is_none());
}

#[tokio::test]
async fn set_max_amount_uses_the_full_erc20_balance() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, weth().address, alice(), wei(7, 18));
	t.stack.context.set_pair(Some(weth()), Some(dai()));

	t.stack.context.set_max_amount().await;

	assert_eq!(t.stack.pair.snapshot(Side::Source, false).amount, Some(dec!(7)));
}

#[tokio::test]
async fn set_max_amount_reserves_wrap_gas_for_native_sources() {
	let t = connected_stack(vec![]);
	t.chain.set_balance(1, eth(1).address, alice(), wei(5, 18));
	t.stack.context.set_pair(Some(eth(1)), Some(dai()));

	t.stack.context.set_max_amount().await;

	assert_eq!(
		t.stack.pair.snapshot(Side::Source, false).amount,
		Some(dec!(5) - dec!(0.00105))
	);
}

#[tokio::test]
async fn tokens_resolve_through_the_directory_capability() {
	let stack = SwapStackBuilder::new()
		.with_wallet(Arc::new(MockWallet::connected(alice(), 1)))
		.with_chain_client(Arc::new(MockChainClient::new()))
		.with_store(Arc::new(MemoryStore::new()))
		.with_intent_api(Arc::new(MockIntentApi::new()))
		.with_token_directory(Arc::new(MockTokenDirectory::with_tokens([weth(), dai()])))
		.build()
		.expect("stack builds");

	assert!(stack.context.set_token_by_address(Side::Source, 1, weth().address).await);
	assert_eq!(
		stack.pair.snapshot(Side::Source, false).token.unwrap().symbol,
		"WETH"
	);

	// unknown tokens are reported, not set
	assert!(!stack.context.set_token_by_address(Side::Destination, 1, alice()).await);
	assert!(stack.pair.snapshot(Side::Destination, false).token.is_none());
}

#[tokio::test]
async fn cross_chain_pairs_route_to_the_cross_chain_strategy() {
	let t = connected_stack(vec![]);
	let arb_dai =
		swapflow::mocks::test_token("DAI", 42161, "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18);
	t.chain.set_balance(1, weth().address, alice(), wei(10, 18));
	t.stack.context.set_pair(Some(weth()), Some(arb_dai));
	t.stack.context.set_amount(Side::Source, dec!(1));

	let snapshot = t.stack.context.get_snapshot(false).await.expect("cross-chain quote");

	assert_eq!(snapshot.strategy_name, "cross-chain-intent");
	assert_eq!(snapshot.destination_amount, dec!(2));
}
