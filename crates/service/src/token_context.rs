//! Single-side token/amount state

use rust_decimal::Decimal;
use swapflow_types::{wrapped_native_token, Token, TokenSnapshot};

/// Holds one side of the pair. Mutations report whether they changed
/// anything so the holder can skip publishing no-op updates caused by
/// re-render churn.
#[derive(Debug, Default)]
pub struct TokenContext {
	snapshot: TokenSnapshot,
}

impl TokenContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the token. Setting the same asset again is a no-op; a real
	/// change resets the amount to zero.
	pub fn set_token(&mut self, token: Option<Token>) -> bool {
		if let (Some(current), Some(incoming)) = (&self.snapshot.token, &token) {
			if current.is_same_asset(incoming) {
				return false;
			}
		}
		if self.snapshot.token.is_none() && token.is_none() {
			return false;
		}
		self.snapshot = TokenSnapshot {
			token,
			amount: Some(Decimal::ZERO),
		};
		true
	}

	pub fn set_amount(&mut self, amount: Decimal) -> bool {
		if self.snapshot.amount == Some(amount) {
			return false;
		}
		self.snapshot.amount = Some(amount);
		true
	}

	/// Current state. With `convert_wrapped`, a native token is substituted
	/// by the chain's wrapped-native stand-in in the returned view only;
	/// held state is never altered.
	pub fn snapshot(&self, convert_wrapped: bool) -> TokenSnapshot {
		if convert_wrapped {
			if let Some(token) = &self.snapshot.token {
				if token.is_native() {
					if let Some(wrapped) = wrapped_native_token(token.chain_id) {
						return TokenSnapshot {
							token: Some(wrapped),
							amount: self.snapshot.amount,
						};
					}
				}
			}
		}
		self.snapshot.clone()
	}
}
