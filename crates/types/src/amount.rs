//! Decimal <-> wei conversions
//!
//! All amount arithmetic in the orchestrator happens on fixed-scale decimals;
//! wei integers appear only at the capability boundaries. Conversions are
//! exact integer scaling on the decimal mantissa, never float math.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
	#[error("negative amount {0} cannot be converted to wei")]
	Negative(Decimal),

	#[error("amount {0} overflows the wei range")]
	Overflow(Decimal),

	#[error("wei value {0} exceeds the representable decimal range")]
	WeiOverflow(U256),
}

/// Scale a decimal amount to the token's smallest unit, truncating excess
/// fractional digits toward zero.
pub fn to_wei(amount: Decimal, decimals: u8) -> Result<U256, AmountError> {
	if amount.is_sign_negative() {
		return Err(AmountError::Negative(amount));
	}
	let normalized = amount.normalize();
	let scale = normalized.scale();
	let mantissa = U256::from(normalized.mantissa().unsigned_abs());
	let decimals = u32::from(decimals);

	if scale > decimals {
		Ok(mantissa / U256::from(10u64).pow(U256::from(scale - decimals)))
	} else {
		mantissa
			.checked_mul(U256::from(10u64).pow(U256::from(decimals - scale)))
			.ok_or(AmountError::Overflow(amount))
	}
}

/// Interpret a wei value at the token's scale.
pub fn from_wei(value: U256, decimals: u8) -> Result<Decimal, AmountError> {
	let digits = value.to_string();
	let rendered = if decimals == 0 {
		digits
	} else {
		let decimals = usize::from(decimals);
		let padded = format!("{digits:0>width$}", width = decimals + 1);
		let split = padded.len() - decimals;
		format!("{}.{}", &padded[..split], &padded[split..])
	};
	Decimal::from_str(&rendered).map_err(|_| AmountError::WeiOverflow(value))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	#[test]
	fn one_ether_to_wei() {
		let wei = to_wei(dec!(1), 18).unwrap();
		assert_eq!(wei, U256::from(10u64).pow(U256::from(18u64)));
	}

	#[test]
	fn fractional_amount_to_wei() {
		let wei = to_wei(dec!(1.5), 6).unwrap();
		assert_eq!(wei, U256::from(1_500_000u64));
	}

	#[test]
	fn excess_fraction_truncates() {
		let wei = to_wei(dec!(0.1234567), 6).unwrap();
		assert_eq!(wei, U256::from(123_456u64));
	}

	#[test]
	fn negative_amount_is_rejected() {
		assert!(matches!(to_wei(dec!(-1), 18), Err(AmountError::Negative(_))));
	}

	#[test]
	fn wei_roundtrip() {
		let amount = dec!(42.000001);
		let wei = to_wei(amount, 6).unwrap();
		assert_eq!(from_wei(wei, 6).unwrap(), amount);
	}

	#[test]
	fn small_wei_values_pad_correctly() {
		assert_eq!(from_wei(U256::from(1u64), 18).unwrap(), dec!(0.000000000000000001));
		assert_eq!(from_wei(U256::ZERO, 18).unwrap(), Decimal::ZERO);
	}
}
