//! Mock capabilities for examples and tests
//!
//! Programmable stand-ins for the injected capabilities: call tracking,
//! failure switches and manual tick/phase control, so scenario tests can
//! drive the orchestrator without any network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use swapflow_types::{
	Address, B256, Bytes, ChainClient, ChainError, ChainId, GasPrice, IntentApi, IntentOrder,
	IntentOrderPhase, IntentOrderUpdate, IntentQuote, IntentQuoteRequest, QuoteApiError, Rate,
	RateError, RateSource, RateSourceAdapter, Token, TxRequest, U256, Wallet, WalletError,
};
use tokio::sync::{broadcast, watch};

/// Deterministic hash for the n-th submitted transaction/order.
fn sequential_hash(n: u64) -> B256 {
	let mut bytes = [0u8; 32];
	bytes[24..].copy_from_slice(&n.to_be_bytes());
	B256::from(bytes)
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

pub struct MockWallet {
	address_tx: watch::Sender<Option<Address>>,
	// Keep one receiver alive so the watch channel is never born closed; without
	// it `send` in `connect` would fail (no receivers) and drop the address.
	_address_rx: watch::Receiver<Option<Address>>,
	chain_id: Mutex<Option<ChainId>>,
	pub sent: Mutex<Vec<TxRequest>>,
	tx_counter: AtomicU64,
	pub reject_transactions: AtomicBool,
}

impl MockWallet {
	pub fn new() -> Self {
		let (address_tx, address_rx) = watch::channel(None);
		Self {
			address_tx,
			_address_rx: address_rx,
			chain_id: Mutex::new(None),
			sent: Mutex::new(Vec::new()),
			tx_counter: AtomicU64::new(0),
			reject_transactions: AtomicBool::new(false),
		}
	}

	pub fn connected(address: Address, chain_id: ChainId) -> Self {
		let wallet = Self::new();
		wallet.connect(address, chain_id);
		wallet
	}

	pub fn connect(&self, address: Address, chain_id: ChainId) {
		*self.chain_id.lock().unwrap() = Some(chain_id);
		let _ = self.address_tx.send(Some(address));
	}

	pub fn disconnect(&self) {
		*self.chain_id.lock().unwrap() = None;
		let _ = self.address_tx.send(None);
	}

	pub fn switch_chain(&self, chain_id: ChainId) {
		*self.chain_id.lock().unwrap() = Some(chain_id);
	}

	pub fn sent_count(&self) -> usize {
		self.sent.lock().unwrap().len()
	}
}

impl Default for MockWallet {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Wallet for MockWallet {
	async fn active_address(&self) -> Option<Address> {
		*self.address_tx.borrow()
	}

	async fn wallet_chain_id(&self) -> Option<ChainId> {
		*self.chain_id.lock().unwrap()
	}

	fn address_stream(&self) -> watch::Receiver<Option<Address>> {
		self.address_tx.subscribe()
	}

	async fn send_transaction(&self, tx: TxRequest) -> Result<B256, WalletError> {
		if self.reject_transactions.load(Ordering::SeqCst) {
			return Err(WalletError::Rejected);
		}
		self.sent.lock().unwrap().push(tx);
		Ok(sequential_hash(self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1))
	}

	async fn sign_typed_data(
		&self,
		_chain_id: ChainId,
		_payload: serde_json::Value,
	) -> Result<Bytes, WalletError> {
		if self.reject_transactions.load(Ordering::SeqCst) {
			return Err(WalletError::Rejected);
		}
		Ok(Bytes::from_static(b"signed-permit"))
	}
}

// ---------------------------------------------------------------------------
// Chain client
// ---------------------------------------------------------------------------

pub struct MockChainClient {
	allowances: DashMap<(ChainId, Address, Address), U256>,
	balances: DashMap<(ChainId, Address, Address), U256>,
	ticks_tx: broadcast::Sender<ChainId>,
	pub fail_gas_estimation: AtomicBool,
	pub estimate_calls: AtomicUsize,
	pub balance_calls: AtomicUsize,
}

impl MockChainClient {
	pub fn new() -> Self {
		let (ticks_tx, _) = broadcast::channel(64);
		Self {
			allowances: DashMap::new(),
			balances: DashMap::new(),
			ticks_tx,
			fail_gas_estimation: AtomicBool::new(false),
			estimate_calls: AtomicUsize::new(0),
			balance_calls: AtomicUsize::new(0),
		}
	}

	pub fn set_allowance(&self, chain_id: ChainId, token: Address, owner: Address, value: U256) {
		self.allowances.insert((chain_id, token, owner), value);
	}

	pub fn set_balance(&self, chain_id: ChainId, token: Address, owner: Address, value: U256) {
		self.balances.insert((chain_id, token, owner), value);
	}

	pub fn emit_tick(&self, chain_id: ChainId) {
		let _ = self.ticks_tx.send(chain_id);
	}
}

impl Default for MockChainClient {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ChainClient for MockChainClient {
	async fn allowance(
		&self,
		chain_id: ChainId,
		token: Address,
		owner: Address,
		_spender: Address,
	) -> Result<U256, ChainError> {
		Ok(self
			.allowances
			.get(&(chain_id, token, owner))
			.map(|entry| *entry)
			.unwrap_or(U256::ZERO))
	}

	async fn token_balance(
		&self,
		chain_id: ChainId,
		token: &Token,
		owner: Address,
	) -> Result<U256, ChainError> {
		self.balance_calls.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.balances
			.get(&(chain_id, token.address, owner))
			.map(|entry| *entry)
			.unwrap_or(U256::ZERO))
	}

	async fn estimate_gas(&self, _tx: &TxRequest) -> Result<U256, ChainError> {
		self.estimate_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_gas_estimation.load(Ordering::SeqCst) {
			return Err(ChainError::GasEstimation {
				reason: "execution reverted".into(),
			});
		}
		Ok(U256::from(50_000u64))
	}

	async fn gas_price(&self, _chain_id: ChainId) -> Result<GasPrice, ChainError> {
		Ok(GasPrice {
			max_fee_per_gas: U256::from(20_000_000_000u64),
			max_priority_fee_per_gas: U256::from(1_000_000_000u64),
		})
	}

	async fn wait_for_transaction(
		&self,
		_chain_id: ChainId,
		_hash: B256,
	) -> Result<(), ChainError> {
		Ok(())
	}

	fn ticks(&self) -> broadcast::Receiver<ChainId> {
		self.ticks_tx.subscribe()
	}
}

// ---------------------------------------------------------------------------
// Intent venue
// ---------------------------------------------------------------------------

pub struct MockIntentApi {
	/// Destination amount per unit of source, applied on top of the wei
	/// amount (both sides are assumed 18-decimals in tests).
	pub multiplier: u64,
	pub cross_chain: bool,
	pub fail_quotes: AtomicBool,
	pub quote_calls: AtomicUsize,
	pub last_request: Mutex<Option<IntentQuoteRequest>>,
	pub submitted: Mutex<Vec<IntentOrder>>,
	pub phase: Mutex<IntentOrderPhase>,
	order_counter: AtomicU64,
}

impl MockIntentApi {
	pub fn new() -> Self {
		Self {
			multiplier: 2,
			cross_chain: false,
			fail_quotes: AtomicBool::new(false),
			quote_calls: AtomicUsize::new(0),
			last_request: Mutex::new(None),
			submitted: Mutex::new(Vec::new()),
			phase: Mutex::new(IntentOrderPhase::Pending),
			order_counter: AtomicU64::new(0),
		}
	}

	pub fn cross_chain() -> Self {
		Self {
			cross_chain: true,
			..Self::new()
		}
	}

	pub fn set_phase(&self, phase: IntentOrderPhase) {
		*self.phase.lock().unwrap() = phase;
	}
}

impl Default for MockIntentApi {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl IntentApi for MockIntentApi {
	fn supports(&self, src_chain_id: ChainId, dst_chain_id: ChainId) -> bool {
		if self.cross_chain {
			src_chain_id != dst_chain_id
		} else {
			src_chain_id == dst_chain_id
		}
	}

	async fn quote(&self, request: &IntentQuoteRequest) -> Result<IntentQuote, QuoteApiError> {
		self.quote_calls.fetch_add(1, Ordering::SeqCst);
		*self.last_request.lock().unwrap() = Some(request.clone());
		if self.fail_quotes.load(Ordering::SeqCst) {
			return Err(QuoteApiError::NoLiquidity);
		}
		let dst_amount_wei = request.amount_wei * U256::from(self.multiplier);
		Ok(IntentQuote {
			quote_id: format!("qt-{}", self.quote_calls.load(Ordering::SeqCst)),
			dst_amount_wei,
			auction_end_amount_wei: dst_amount_wei * U256::from(99u8) / U256::from(100u8),
			auction_duration_secs: 180,
			auto_slippage_percent: Decimal::ONE,
			recommended_preset: "fast".into(),
			raw: serde_json::json!({ "permit_attached": request.permit.is_some() }),
		})
	}

	async fn submit_order(&self, order: &IntentOrder) -> Result<B256, QuoteApiError> {
		self.submitted.lock().unwrap().push(order.clone());
		Ok(sequential_hash(0xF000 + self.order_counter.fetch_add(1, Ordering::SeqCst) + 1))
	}

	async fn order_status(&self, _hash: B256) -> Result<IntentOrderUpdate, QuoteApiError> {
		Ok(IntentOrderUpdate {
			phase: *self.phase.lock().unwrap(),
			making_amount_wei: U256::from(1_000u64),
			taking_amount_wei: U256::from(2_000u64),
			auction_duration_secs: 180,
			auction_start: Some(Utc::now()),
			cancel_tx: None,
		})
	}

	async fn cancel_calldata(&self, _hash: B256) -> Result<Bytes, QuoteApiError> {
		Ok(Bytes::from_static(b"cancel-order"))
	}
}

// ---------------------------------------------------------------------------
// Token directory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockTokenDirectory {
	tokens: DashMap<(ChainId, Address), Token>,
}

impl MockTokenDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
		let directory = Self::new();
		for token in tokens {
			directory.insert(token);
		}
		directory
	}

	pub fn insert(&self, token: Token) {
		self.tokens.insert((token.chain_id, token.address), token);
	}
}

#[async_trait]
impl swapflow_types::TokenDirectory for MockTokenDirectory {
	async fn token(&self, chain_id: ChainId, address: Address) -> Option<Token> {
		self.tokens.get(&(chain_id, address)).map(|entry| entry.clone())
	}
}

// ---------------------------------------------------------------------------
// Rate adapter
// ---------------------------------------------------------------------------

pub struct MockRateAdapter {
	name: String,
	chains: Vec<ChainId>,
	rate: Option<Decimal>,
	pub calls: AtomicUsize,
}

impl MockRateAdapter {
	/// Adapter answering with a fixed direct rate on the given chains.
	pub fn with_rate(name: impl Into<String>, chains: Vec<ChainId>, rate: Decimal) -> Self {
		Self {
			name: name.into(),
			chains,
			rate: Some(rate),
			calls: AtomicUsize::new(0),
		}
	}

	/// Adapter that always fails, for filtering tests.
	pub fn failing(name: impl Into<String>, chains: Vec<ChainId>) -> Self {
		Self {
			name: name.into(),
			chains,
			rate: None,
			calls: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl RateSourceAdapter for MockRateAdapter {
	fn name(&self) -> &str {
		&self.name
	}

	fn supports_chain(&self, chain_id: ChainId) -> bool {
		self.chains.contains(&chain_id)
	}

	async fn rate(
		&self,
		_chain_id: ChainId,
		source: &Token,
		destination: &Token,
	) -> Result<Rate, RateError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		match self.rate {
			Some(rate) => Ok(Rate::direct(
				RateSource::OnChain,
				rate,
				source.clone(),
				destination.clone(),
			)),
			None => Err(RateError::EmptyRate),
		}
	}
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn test_token(symbol: &str, chain_id: ChainId, address: &str, decimals: u8) -> Token {
	Token {
		chain_id,
		address: address.parse().expect("valid address literal"),
		symbol: symbol.into(),
		decimals,
		name: symbol.into(),
		supports_cross_chain: true,
		is_internal_wrap_token: false,
	}
}

pub fn eth(chain_id: ChainId) -> Token {
	Token {
		chain_id,
		address: swapflow_types::NATIVE_TOKEN_ADDRESS,
		symbol: "ETH".into(),
		decimals: 18,
		name: "Ether".into(),
		supports_cross_chain: true,
		is_internal_wrap_token: false,
	}
}

pub fn weth() -> Token {
	test_token("WETH", 1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18)
}

pub fn usdc() -> Token {
	test_token("USDC", 1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6)
}

pub fn dai() -> Token {
	test_token("DAI", 1, "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18)
}

pub fn alice() -> Address {
	"0x00000000000000000000000000000000000A11CE".parse().expect("valid address literal")
}
