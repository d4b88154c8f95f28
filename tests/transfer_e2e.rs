//! Transfer-requirement resolution scenarios.

use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use swapflow::mocks::{alice, usdc, MockChainClient, MockWallet};
use swapflow::types::{
	PermitProvider, ResolverError, TransferRequirements, TransferResolver,
};
use swapflow::{ApprovalResolver, MemoryStore, Permit2Resolver, TransferRequirementPipeline, U256};

fn usdc_wei(units: u64) -> U256 {
	U256::from(units) * U256::from(1_000_000u64)
}

#[tokio::test]
async fn satisfied_allowance_returns_no_steps() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 1));
	chain.set_allowance(1, usdc().address, alice(), usdc_wei(100));

	let resolver = ApprovalResolver::new(chain.clone(), wallet);
	let steps = resolver.provide_requirements(alice(), &usdc(), dec!(25)).await.unwrap();

	assert!(steps.is_empty());
	// no simulation, no transaction: the pure existence check was enough
	assert_eq!(chain.estimate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn insufficient_allowance_yields_a_presimulated_approve_step() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 1));

	let resolver = ApprovalResolver::new(chain.clone(), wallet.clone());
	let mut steps = resolver.provide_requirements(alice(), &usdc(), dec!(25)).await.unwrap();

	assert_eq!(steps.len(), 1);
	assert_eq!(steps[0].alias(), "Approve");
	assert_eq!(chain.estimate_calls.load(Ordering::SeqCst), 1);

	// the confirmed allowance read happens after the transaction; make it pass
	chain.set_allowance(1, usdc().address, alice(), usdc_wei(1_000_000));
	steps.remove(0).wait().await.unwrap();

	assert_eq!(wallet.sent_count(), 1);
	assert_eq!(wallet.sent.lock().unwrap()[0].to, usdc().address);
}

#[tokio::test]
async fn approval_confirmed_below_half_the_requested_amount_fails() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 1));

	let resolver = ApprovalResolver::new(chain.clone(), wallet);
	let mut steps = resolver.provide_requirements(alice(), &usdc(), dec!(25)).await.unwrap();

	// the transaction "succeeds" but the resulting allowance is half or less
	chain.set_allowance(1, usdc().address, alice(), usdc_wei(25) / U256::from(2u8));
	let err = steps.remove(0).wait().await.unwrap_err();
	assert!(matches!(err, ResolverError::ConfirmationMismatch));
}

#[tokio::test]
async fn reverting_approval_is_rejected_before_any_step_is_returned() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 1));
	chain.fail_gas_estimation.store(true, Ordering::SeqCst);

	let resolver = ApprovalResolver::new(chain, wallet);
	let err = resolver.provide_requirements(alice(), &usdc(), dec!(25)).await.unwrap_err();
	assert!(matches!(err, ResolverError::ApproveWouldRevert));
}

#[tokio::test]
async fn provider_exhaustion_is_fatal() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 1));
	chain.fail_gas_estimation.store(true, Ordering::SeqCst);

	let approval = Arc::new(ApprovalResolver::new(chain, wallet));
	let pipeline = TransferRequirementPipeline::new(
		vec![approval as Arc<dyn TransferResolver>],
		None,
	);

	let err = pipeline.provide_requirements(alice(), &usdc(), dec!(25)).await.unwrap_err();
	assert!(matches!(err, ResolverError::NoSupportedProviders));
}

#[tokio::test]
async fn approve_step_requires_the_wallet_on_the_token_chain() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 137));

	let resolver = ApprovalResolver::new(chain, wallet.clone());
	let mut steps = resolver.provide_requirements(alice(), &usdc(), dec!(25)).await.unwrap();

	let err = steps.remove(0).wait().await.unwrap_err();
	assert!(matches!(err, ResolverError::WrongNetwork { expected: 1 }));
	assert_eq!(wallet.sent_count(), 0);
}

#[tokio::test]
async fn cached_permit_short_circuits_the_pipeline() {
	let chain = Arc::new(MockChainClient::new());
	let wallet = Arc::new(MockWallet::connected(alice(), 1));
	let store = Arc::new(MemoryStore::new());

	// sign once to populate the permit cache
	let permits = Arc::new(Permit2Resolver::new(wallet.clone(), store.clone()));
	let mut sign_steps =
		permits.provide_requirements(alice(), &usdc(), dec!(5)).await.unwrap();
	assert_eq!(sign_steps[0].alias(), "Sign permit");
	sign_steps.remove(0).wait().await.unwrap();
	assert!(permits.cached_permit(alice(), &usdc()).is_some());

	let approval = Arc::new(ApprovalResolver::new(chain.clone(), wallet));
	let pipeline = TransferRequirementPipeline::new(
		vec![approval as Arc<dyn TransferResolver>],
		Some(permits as Arc<dyn TransferResolver>),
	);

	let steps = pipeline.provide_requirements(alice(), &usdc(), dec!(5)).await.unwrap();
	assert!(steps.is_empty());
	// the approval provider's simulation path was never touched
	assert_eq!(chain.estimate_calls.load(Ordering::SeqCst), 0);
}
