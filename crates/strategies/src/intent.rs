//! Intent-auction strategies
//!
//! Quoting and execution through an auction-based intent venue. The single-
//! chain and cross-chain variants share the whole flow and differ only in
//! their support gate, rate source and the venue instance they talk to.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use swapflow_types::{
	from_wei, settlement_address, to_wei, wrapped_native_token, Address, AmountSource, IntentApi,
	IntentOrder, IntentOrderPhase, IntentQuote, NativeWrap, OrderError, OrderRecord, OrderStatus,
	OrderStore, PermitProvider, Rate, RateSource, ResolverActions, ResolverStep, SnapshotOptions,
	StorageError, StrategyError, StrategyResult, StrategySnapshot, SwapOrderStatus, SwapSettings,
	SwapStrategy, Token, TokenPair, TxRequest, Wallet, B256, U256,
};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
	SingleChain,
	CrossChain,
}

impl IntentKind {
	fn name(&self) -> &'static str {
		match self {
			IntentKind::SingleChain => "intent-auction",
			IntentKind::CrossChain => "cross-chain-intent",
		}
	}

	fn rate_source(&self) -> RateSource {
		match self {
			IntentKind::SingleChain => RateSource::Intent,
			IntentKind::CrossChain => RateSource::CrossChainIntent,
		}
	}

	fn pair_supported(&self, pair: &TokenPair) -> bool {
		match self {
			IntentKind::SingleChain => pair.source.chain_id == pair.destination.chain_id,
			IntentKind::CrossChain => {
				pair.source.chain_id != pair.destination.chain_id
					&& pair.source.supports_cross_chain
					&& pair.destination.supports_cross_chain
			}
		}
	}
}

pub struct IntentStrategy {
	kind: IntentKind,
	api: Arc<dyn IntentApi>,
	wallet: Arc<dyn Wallet>,
	orders: Arc<dyn OrderStore>,
	amounts: Arc<dyn AmountSource>,
	settings: Arc<SwapSettings>,
	requirements: Arc<dyn swapflow_types::TransferRequirements>,
	wrap: Arc<dyn NativeWrap>,
	permits: Option<Arc<dyn PermitProvider>>,
}

impl IntentStrategy {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		kind: IntentKind,
		api: Arc<dyn IntentApi>,
		wallet: Arc<dyn Wallet>,
		orders: Arc<dyn OrderStore>,
		amounts: Arc<dyn AmountSource>,
		settings: Arc<SwapSettings>,
		requirements: Arc<dyn swapflow_types::TransferRequirements>,
		wrap: Arc<dyn NativeWrap>,
		permits: Option<Arc<dyn PermitProvider>>,
	) -> Self {
		Self {
			kind,
			api,
			wallet,
			orders,
			amounts,
			settings,
			requirements,
			wrap,
			permits,
		}
	}

	fn unsupported(&self) -> StrategyError {
		StrategyError::Unsupported {
			strategy: self.name().into(),
		}
	}

	fn quote_payload(snapshot: &StrategySnapshot) -> StrategyResult<IntentQuote> {
		let data = snapshot
			.provider_data
			.as_ref()
			.ok_or(StrategyError::MissingQuoteId)?;
		Ok(serde_json::from_value(data.clone()).map_err(StorageError::from)?)
	}

	/// The wrap stand-in means the user actually holds the native asset; the
	/// deposit must run before the venue can pull the wrapped token.
	fn needs_wrap_step(token: &Token) -> bool {
		token.is_internal_wrap_token
			&& wrapped_native_token(token.chain_id)
				.is_some_and(|wrapped| wrapped.address == token.address)
	}

	async fn try_cancel(&self, record: &OrderRecord, hash: B256) -> StrategyResult<B256> {
		let update = self.api.order_status(hash).await?;
		if update.phase == IntentOrderPhase::Cancelled || update.cancel_tx.is_some() {
			return Err(OrderError::AlreadyCancelled { hash }.into());
		}

		let calldata = self.api.cancel_calldata(hash).await?;
		let settlement =
			settlement_address(record.src_chain_id).ok_or_else(|| self.unsupported())?;

		let current_chain = self.wallet.wallet_chain_id().await;
		if current_chain != Some(record.src_chain_id) {
			return Err(OrderError::WrongNetwork {
				expected: record.src_chain_id,
			}
			.into());
		}
		let wallet_address = self.wallet.active_address().await;
		if wallet_address != Some(record.account) {
			return Err(OrderError::WrongAccount.into());
		}

		Ok(self
			.wallet
			.send_transaction(TxRequest {
				chain_id: record.src_chain_id,
				from: record.account,
				to: settlement,
				data: calldata,
				value: U256::ZERO,
			})
			.await?)
	}
}

#[async_trait]
impl SwapStrategy for IntentStrategy {
	fn name(&self) -> &str {
		self.kind.name()
	}

	async fn supports(&self, pair: &TokenPair, wallet_address: Option<Address>) -> bool {
		wallet_address.is_some()
			&& self.kind.pair_supported(pair)
			&& self.api.supports(pair.source.chain_id, pair.destination.chain_id)
	}

	async fn quote(
		&self,
		pair: &TokenPair,
		amount: Decimal,
		wallet_address: Option<Address>,
		finalize: bool,
	) -> StrategyResult<StrategySnapshot> {
		let wallet_address = wallet_address.ok_or(StrategyError::WalletNotConnected)?;
		if amount.is_zero() {
			return Err(StrategyError::ZeroAmount);
		}
		if !self.supports(pair, Some(wallet_address)).await {
			return Err(self.unsupported());
		}

		let balance = self.amounts.max_amount().await;
		if balance < amount {
			return Err(StrategyError::InsufficientBalance);
		}

		let mut source_token = pair.source.clone();
		if source_token.is_native() {
			source_token =
				wrapped_native_token(source_token.chain_id).ok_or_else(|| self.unsupported())?;
		}
		let destination_token = pair.destination.clone();

		let permit = self
			.permits
			.as_ref()
			.and_then(|permits| permits.cached_permit(wallet_address, &source_token));

		let quote = self
			.api
			.quote(&swapflow_types::IntentQuoteRequest {
				wallet_address,
				src_chain_id: source_token.chain_id,
				dst_chain_id: destination_token.chain_id,
				src_token: source_token.address,
				dst_token: destination_token.address,
				amount_wei: to_wei(amount, source_token.decimals)?,
				permit,
				enable_estimate: finalize,
			})
			.await?;
		if quote.quote_id.is_empty() {
			return Err(StrategyError::MissingQuoteId);
		}

		let destination_amount = from_wei(quote.dst_amount_wei, destination_token.decimals)?;
		if destination_amount.is_zero() {
			return Err(StrategyError::Api(swapflow_types::QuoteApiError::NoLiquidity));
		}

		let rate = Rate {
			source: self.kind.rate_source(),
			is_reverted: false,
			rate: destination_amount / amount,
			reverted_rate: amount / destination_amount,
			source_token: source_token.clone(),
			destination_token: destination_token.clone(),
		};

		// a user slippage override beats the venue's auction floor
		let min_receive = match self.settings.slippage_percent() {
			Some(slippage) => {
				destination_amount - destination_amount * slippage / Decimal::ONE_HUNDRED
			}
			None => from_wei(quote.auction_end_amount_wei, destination_token.decimals)?,
		};
		let slippage_percent = self
			.settings
			.slippage_percent()
			.unwrap_or(quote.auto_slippage_percent);
		let auction_time_secs = self
			.settings
			.auction_time_secs()
			.unwrap_or(quote.auction_duration_secs);

		let provider_data = Some(serde_json::to_value(&quote).map_err(StorageError::from)?);

		Ok(StrategySnapshot {
			wallet_address: Some(wallet_address),
			source_token,
			destination_token,
			source_amount: amount,
			destination_amount,
			options: SnapshotOptions {
				rate: Some(rate.clone()),
				slippage_percent: Some(slippage_percent),
				auction_time_secs: Some(auction_time_secs),
				network_fee: Some(Decimal::ZERO),
				min_receive: Some(min_receive),
			},
			rate,
			strategy_name: self.name().into(),
			provider_data,
		})
	}

	async fn swap(&self, snapshot: &StrategySnapshot) -> StrategyResult<B256> {
		let wallet_address = snapshot
			.wallet_address
			.ok_or(StrategyError::WalletNotConnected)?;
		let quote = Self::quote_payload(snapshot)?;
		if quote.quote_id.is_empty() {
			return Err(StrategyError::MissingQuoteId);
		}

		let hash = self
			.api
			.submit_order(&IntentOrder {
				quote_id: quote.quote_id,
				wallet_address,
				src_token: snapshot.source_token.address,
				dst_token: snapshot.destination_token.address,
				amount_wei: to_wei(snapshot.source_amount, snapshot.source_token.decimals)?,
				preset: quote.recommended_preset,
			})
			.await?;

		self.orders
			.save_order(OrderRecord {
				hash,
				src_token_address: snapshot.source_token.address,
				src_chain_id: snapshot.source_token.chain_id,
				dst_token_address: snapshot.destination_token.address,
				dst_chain_id: snapshot.destination_token.chain_id,
				strategy_name: self.name().into(),
				account: wallet_address,
			})
			.await?;

		Ok(hash)
	}

	async fn prepare_swap(&self, snapshot: &StrategySnapshot) -> StrategyResult<ResolverActions> {
		let wallet_address = snapshot
			.wallet_address
			.ok_or(StrategyError::WalletNotConnected)?;
		let pair = TokenPair {
			source: snapshot.source_token.clone(),
			destination: snapshot.destination_token.clone(),
		};
		if !self.supports(&pair, Some(wallet_address)).await {
			return Err(self.unsupported());
		}

		let requirements = self
			.requirements
			.provide_requirements(wallet_address, &snapshot.source_token, snapshot.source_amount)
			.await?;

		if Self::needs_wrap_step(&snapshot.source_token) {
			let wrap = Arc::clone(&self.wrap);
			let chain_id = snapshot.source_token.chain_id;
			let amount = snapshot.source_amount;
			let wrap_step = ResolverStep::new("Wrap", async move {
				wrap.wrap(chain_id, amount).await?;
				Ok(())
			});
			let mut actions = vec![wrap_step];
			actions.extend(requirements);
			return Ok(actions);
		}

		Ok(requirements)
	}

	async fn order_status(&self, hash: B256) -> StrategyResult<SwapOrderStatus> {
		let record = self
			.orders
			.get_order(&hash)
			.await?
			.ok_or(OrderError::NotFound { hash })?;
		let update = self.api.order_status(hash).await?;

		let status = match update.phase {
			IntentOrderPhase::Pending | IntentOrderPhase::PartiallyFilled => OrderStatus::Pending,
			IntentOrderPhase::Filled => OrderStatus::Executed,
			IntentOrderPhase::Expired => OrderStatus::Expired,
			IntentOrderPhase::Cancelled => OrderStatus::Cancelled,
			IntentOrderPhase::Refunding => OrderStatus::Refunding,
			IntentOrderPhase::Refunded => OrderStatus::Refunded,
			IntentOrderPhase::Failed => OrderStatus::Failed,
		};

		Ok(SwapOrderStatus {
			status,
			src_chain_id: record.src_chain_id,
			src_token_address: record.src_token_address,
			dst_chain_id: record.dst_chain_id,
			dst_token_address: record.dst_token_address,
			making_amount: update.making_amount_wei,
			taking_amount: update.taking_amount_wei,
			auction_duration_secs: update.auction_duration_secs,
			auction_start: update.auction_start,
		})
	}

	/// Guarded cancel: ownership, network and venue state are all checked;
	/// failures degrade to `None` since the order may have been filled or
	/// cancelled concurrently.
	async fn cancel_order(&self, hash: B256) -> StrategyResult<Option<B256>> {
		let Some(record) = self.orders.get_order(&hash).await? else {
			return Ok(None);
		};
		if record.strategy_name != self.name() {
			return Ok(None);
		}

		match self.try_cancel(&record, hash).await {
			Ok(cancel_tx) => {
				self.orders.delete_order(&hash).await?;
				Ok(Some(cancel_tx))
			}
			Err(err) => {
				warn!(%hash, %err, "order cancellation failed");
				Ok(None)
			}
		}
	}
}
