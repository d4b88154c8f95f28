//! Swap context orchestrator
//!
//! Composes the pair holder, the strategy registry, the order repository and
//! the wallet/chain capabilities into one reactive quote/execute/track API.
//!
//! One background task merges every recomputation trigger (debounced chain
//! ticks, wallet changes, pair-side streams, explicit refreshes) and always
//! operates on the latest one: each trigger bumps a generation counter and a
//! resolution whose generation was superseded is discarded unpublished.

use alloy_primitives::{Address, B256};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swapflow_storage::SingleFlight;
use swapflow_types::{
	tokens_equal, AmountSource, ChainClient, ChainId, OrderStore, ResolverActions, Side,
	StorageError, StrategyError, StrategySnapshot, SwapOrderStatus, SwapStrategy, Token,
	TokenDirectory, TokenPair, TokenSnapshot, Wallet,
};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::pair_holder::PairHolder;

#[derive(Debug, Error)]
pub enum ContextError {
	#[error("strategy {name} is not registered")]
	UnknownStrategy { name: String },

	#[error("order {hash} not found")]
	OrderNotFound { hash: B256 },

	#[error(transparent)]
	Strategy(#[from] StrategyError),

	#[error(transparent)]
	Storage(#[from] StorageError),
}

pub struct SwapContext {
	wallet: Arc<dyn Wallet>,
	chain: Arc<dyn ChainClient>,
	pair: Arc<PairHolder>,
	strategies: IndexMap<String, Arc<dyn SwapStrategy>>,
	orders: Arc<dyn OrderStore>,
	amounts: Arc<dyn AmountSource>,
	directory: Option<Arc<dyn TokenDirectory>>,
	tick_debounce: Duration,

	snapshot_tx: watch::Sender<Option<StrategySnapshot>>,
	loading_tx: watch::Sender<bool>,
	// Retained receivers keep these watch channels open so published values are
	// stored even when no external subscriber is attached; otherwise `send`
	// fails silently (no receivers) and `borrow` would keep reading the initial
	// value.
	_snapshot_keepalive: watch::Receiver<Option<StrategySnapshot>>,
	_loading_keepalive: watch::Receiver<bool>,
	refresh_tx: mpsc::UnboundedSender<u64>,
	refresh_rx: Mutex<Option<mpsc::UnboundedReceiver<u64>>>,
	refresh_seq: AtomicU64,
	completed_tx: broadcast::Sender<u64>,
	generation: AtomicU64,
	publish_lock: Mutex<()>,
	pipeline: Mutex<Option<JoinHandle<()>>>,
	resolve_flight: SingleFlight<String, Option<StrategySnapshot>>,
}

impl SwapContext {
	pub fn new(
		wallet: Arc<dyn Wallet>,
		chain: Arc<dyn ChainClient>,
		pair: Arc<PairHolder>,
		strategies: IndexMap<String, Arc<dyn SwapStrategy>>,
		orders: Arc<dyn OrderStore>,
		amounts: Arc<dyn AmountSource>,
		directory: Option<Arc<dyn TokenDirectory>>,
		tick_debounce: Duration,
	) -> Arc<Self> {
		let (snapshot_tx, snapshot_keepalive) = watch::channel(None);
		let (loading_tx, loading_keepalive) = watch::channel(false);
		let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
		let (completed_tx, _) = broadcast::channel(64);
		Arc::new(Self {
			wallet,
			chain,
			pair,
			strategies,
			orders,
			amounts,
			directory,
			tick_debounce,
			snapshot_tx,
			loading_tx,
			_snapshot_keepalive: snapshot_keepalive,
			_loading_keepalive: loading_keepalive,
			refresh_tx,
			refresh_rx: Mutex::new(Some(refresh_rx)),
			refresh_seq: AtomicU64::new(0),
			completed_tx,
			generation: AtomicU64::new(0),
			publish_lock: Mutex::new(()),
			pipeline: Mutex::new(None),
			resolve_flight: SingleFlight::new(),
		})
	}

	/// Start the recomputation pipeline. Idempotent; the first call also
	/// kicks off the initial computation so late subscribers see a value.
	pub fn start(self: &Arc<Self>) {
		let mut pipeline = self.pipeline.lock().expect("pipeline lock poisoned");
		if pipeline.is_some() {
			return;
		}
		let refresh_rx = self
			.refresh_rx
			.lock()
			.expect("pipeline lock poisoned")
			.take()
			.expect("refresh receiver already taken");
		let ctx = Arc::clone(self);
		*pipeline = Some(tokio::spawn(ctx.run_pipeline(refresh_rx)));
		info!(strategies = self.strategies.len(), "swap context pipeline started");
	}

	/// Stop the background pipeline. Streams keep replaying the last
	/// published values.
	pub fn shutdown(&self) {
		if let Some(handle) = self.pipeline.lock().expect("pipeline lock poisoned").take() {
			handle.abort();
		}
	}

	async fn run_pipeline(self: Arc<Self>, mut refresh_rx: mpsc::UnboundedReceiver<u64>) {
		let mut ticks = self.chain.ticks();
		let mut wallet_rx = self.wallet.address_stream();
		let mut source_rx = self.pair.subscribe(Side::Source);
		let mut destination_rx = self.pair.subscribe(Side::Destination);
		let mut last_destination_token = destination_rx.borrow().token.clone();
		let mut tick_deadline: Option<Instant> = None;
		let mut ticks_open = true;
		let mut explicit_mark = 0u64;

		self.spawn_recompute(explicit_mark);

		loop {
			tokio::select! {
				tick = ticks.recv(), if ticks_open => {
					match tick {
						// collapse tick bursts into one recomputation
						Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
							tick_deadline = Some(Instant::now() + self.tick_debounce);
						}
						Err(broadcast::error::RecvError::Closed) => ticks_open = false,
					}
					continue;
				}
				_ = sleep_until_some(tick_deadline), if tick_deadline.is_some() => {
					tick_deadline = None;
				}
				changed = wallet_rx.changed() => {
					if changed.is_err() {
						break;
					}
				}
				changed = source_rx.changed() => {
					if changed.is_err() {
						break;
					}
				}
				changed = destination_rx.changed() => {
					if changed.is_err() {
						break;
					}
					// the destination amount is derived from the snapshot;
					// only a token change on that side re-quotes
					let token = destination_rx.borrow().token.clone();
					let fire =
						!tokens_equal(token.as_ref(), last_destination_token.as_ref());
					last_destination_token = token;
					if !fire {
						continue;
					}
				}
				mark = refresh_rx.recv() => {
					match mark {
						Some(mark) => explicit_mark = mark,
						None => break,
					}
				}
			}
			self.spawn_recompute(explicit_mark);
		}
	}

	/// Launch one recomputation for the current pair state. `mark` is the
	/// newest explicit-refresh sequence this computation covers; it is echoed
	/// on the completion channel so `get_snapshot` can prove freshness.
	fn spawn_recompute(self: &Arc<Self>, mark: u64) {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let _ = self.loading_tx.send(true);
		let ctx = Arc::clone(self);
		tokio::spawn(async move {
			let snapshot = ctx.resolve_snapshot(false).await;

			let guard = ctx.publish_lock.lock().expect("publish lock poisoned");
			if ctx.generation.load(Ordering::SeqCst) != generation {
				// superseded by a newer trigger; discard unpublished
				return;
			}
			let destination_amount = snapshot
				.as_ref()
				.map(|snapshot| snapshot.destination_amount)
				.unwrap_or(Decimal::ZERO);
			let _ = ctx.snapshot_tx.send(snapshot);
			// feed the derived amount back into the destination side; the
			// destination trigger dedups by token identity, so this cannot
			// re-enter the pipeline
			ctx.pair.set_amount(Side::Destination, destination_amount);
			let _ = ctx.loading_tx.send(false);
			let _ = ctx.completed_tx.send(mark);
			drop(guard);
		});
	}

	/// Resolve a snapshot through the strategy registry. Concurrent identical
	/// resolutions (same inputs) coalesce into one pass; any input change
	/// misses the in-flight key, so a fresh call never observes stale state.
	async fn resolve_snapshot(&self, finalize: bool) -> Option<StrategySnapshot> {
		let source = self.pair.snapshot(Side::Source, true);
		let destination = self.pair.snapshot(Side::Destination, false);
		let wallet_address = self.wallet.active_address().await;
		let key = resolve_key(finalize, &source, &destination, wallet_address);
		let strategies = self.strategies.clone();
		self.resolve_flight
			.run(key, move || {
				resolve_uncached(strategies, source, destination, wallet_address, finalize)
			})
			.await
	}

	/// Force a fresh recomputation and return its result.
	///
	/// The returned snapshot is never older than the pair/amount state at the
	/// moment of the call. With `finalize`, the published pipeline value is
	/// bypassed and the winning strategy is asked for an executable quote.
	pub async fn get_snapshot(&self, finalize: bool) -> Option<StrategySnapshot> {
		let mut completed = self.completed_tx.subscribe();
		let mark = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
		if self.refresh_tx.send(mark).is_err() {
			warn!("refresh requested on a stopped pipeline");
			return None;
		}

		loop {
			match completed.recv().await {
				Ok(done) if done >= mark => break,
				Ok(_) => continue,
				Err(broadcast::error::RecvError::Lagged(_)) => continue,
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}

		if finalize {
			self.resolve_snapshot(true).await
		} else {
			self.snapshot_tx.borrow().clone()
		}
	}

	/// Replay-latest stream of published snapshots; `None` means "no quote".
	pub fn snapshot_stream(&self) -> watch::Receiver<Option<StrategySnapshot>> {
		self.snapshot_tx.subscribe()
	}

	pub fn loading_stream(&self) -> watch::Receiver<bool> {
		self.loading_tx.subscribe()
	}

	pub fn set_pair(&self, source: Option<Token>, destination: Option<Token>) {
		self.pair.set_pair(source, destination);
	}

	pub fn set_token(&self, side: Side, token: Token) {
		self.pair.set_token(Some(token), side);
	}

	/// Resolve a token through the metadata capability and set it on a side.
	/// Returns false when no directory is wired or the token is unknown.
	pub async fn set_token_by_address(
		&self,
		side: Side,
		chain_id: ChainId,
		address: Address,
	) -> bool {
		let Some(directory) = &self.directory else {
			return false;
		};
		match directory.token(chain_id, address).await {
			Some(token) => {
				self.pair.set_token(Some(token), side);
				true
			}
			None => {
				debug!(chain_id, %address, "token not found in directory");
				false
			}
		}
	}

	pub fn switch_pair(&self) {
		self.pair.switch_pair();
	}

	pub fn side_stream(&self, side: Side) -> watch::Receiver<TokenSnapshot> {
		self.pair.subscribe(side)
	}

	pub fn side_snapshot(&self, side: Side) -> TokenSnapshot {
		self.pair.snapshot(side, false)
	}

	pub fn set_amount(&self, side: Side, amount: Decimal) {
		self.pair.set_amount(side, amount);
	}

	pub async fn get_max_amount(&self) -> Decimal {
		self.amounts.max_amount().await
	}

	pub async fn set_max_amount(&self) {
		let amount = self.get_max_amount().await;
		self.set_amount(Side::Source, amount);
	}

	/// Execute a quoted swap through the strategy that produced the snapshot.
	pub async fn swap(&self, snapshot: &StrategySnapshot) -> Result<B256, ContextError> {
		let strategy = self.strategy(&snapshot.strategy_name)?;
		Ok(strategy.swap(snapshot).await?)
	}

	/// Prerequisite steps for the quoted swap, in execution order.
	pub async fn prepare_swap(
		&self,
		snapshot: &StrategySnapshot,
	) -> Result<ResolverActions, ContextError> {
		let strategy = self.strategy(&snapshot.strategy_name)?;
		Ok(strategy.prepare_swap(snapshot).await?)
	}

	pub async fn get_order_status(&self, hash: B256) -> Result<SwapOrderStatus, ContextError> {
		let strategy = self.strategy_for_order(hash).await?;
		let status = strategy.order_status(hash).await?;
		if status.status.is_terminal() {
			self.orders.delete_order(&hash).await?;
		}
		Ok(status)
	}

	pub async fn cancel_order(&self, hash: B256) -> Result<Option<B256>, ContextError> {
		let strategy = self.strategy_for_order(hash).await?;
		Ok(strategy.cancel_order(hash).await?)
	}

	fn strategy(&self, name: &str) -> Result<&Arc<dyn SwapStrategy>, ContextError> {
		self.strategies.get(name).ok_or_else(|| ContextError::UnknownStrategy {
			name: name.to_string(),
		})
	}

	async fn strategy_for_order(
		&self,
		hash: B256,
	) -> Result<&Arc<dyn SwapStrategy>, ContextError> {
		let record = self
			.orders
			.get_order(&hash)
			.await?
			.ok_or(ContextError::OrderNotFound { hash })?;
		self.strategy(&record.strategy_name)
	}
}

fn resolve_key(
	finalize: bool,
	source: &TokenSnapshot,
	destination: &TokenSnapshot,
	wallet_address: Option<Address>,
) -> String {
	let token_id = |token: &Option<Token>| {
		token
			.as_ref()
			.map(|token| format!("{}:{}", token.chain_id, token.address))
			.unwrap_or_else(|| "-".into())
	};
	format!(
		"{finalize}:{}:{:?}:{}:{:?}",
		token_id(&source.token),
		source.amount,
		token_id(&destination.token),
		wallet_address,
	)
}

/// Strategy fallback: first strategy that does not fail wins, remaining
/// strategies are not tried. Exhaustion and missing inputs yield `None`
/// ("no quote"), never an error.
async fn resolve_uncached(
	strategies: IndexMap<String, Arc<dyn SwapStrategy>>,
	source: TokenSnapshot,
	destination: TokenSnapshot,
	wallet_address: Option<Address>,
	finalize: bool,
) -> Option<StrategySnapshot> {
	let (Some(source_token), Some(destination_token), Some(amount)) =
		(source.token, destination.token, source.amount)
	else {
		return None;
	};

	let pair = TokenPair {
		source: source_token,
		destination: destination_token,
	};

	for (name, strategy) in &strategies {
		match strategy.quote(&pair, amount, wallet_address, finalize).await {
			Ok(snapshot) => {
				debug!(strategy = %name, "strategy produced a snapshot");
				return Some(snapshot);
			}
			Err(err) => debug!(strategy = %name, %err, "strategy declined the pair"),
		}
	}

	debug!("no strategy could quote the pair");
	None
}

async fn sleep_until_some(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => tokio::time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}
