//! Wallet capability trait

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::chain::{ChainId, TxRequest};

#[derive(Debug, Error)]
pub enum WalletError {
	#[error("wallet is not connected")]
	NotConnected,

	#[error("user rejected the request")]
	Rejected,

	#[error("wallet transport error: {0}")]
	Transport(String),
}

/// The connected wallet: identity, signing and transaction submission.
#[async_trait]
pub trait Wallet: Send + Sync {
	async fn active_address(&self) -> Option<Address>;

	/// Chain the wallet is currently switched to, which may differ from the
	/// chain a pending action needs.
	async fn wallet_chain_id(&self) -> Option<ChainId>;

	/// Replay-latest stream of connection/account changes.
	fn address_stream(&self) -> watch::Receiver<Option<Address>>;

	async fn send_transaction(&self, tx: TxRequest) -> Result<B256, WalletError>;

	/// EIP-712 typed-data signature over an opaque payload.
	async fn sign_typed_data(
		&self,
		chain_id: ChainId,
		payload: serde_json::Value,
	) -> Result<Bytes, WalletError>;
}
