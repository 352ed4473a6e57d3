//! Conversion between human-entered decimal strings and on-chain fixed-point integers.

use crate::errors::SwapError;
use bigdecimal::BigDecimal;
use ethers::types::U256;
use num_bigint::{BigInt, Sign};

/// Fractional digits assumed for every token unless configured otherwise.
///
/// Token metadata is never queried; this is a stated assumption, not a fact
/// about any particular token.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Parse `input` as a non-negative decimal and scale it by `10^decimals`.
///
/// Inputs carrying more than `decimals` fractional digits are rejected, never
/// truncated. Surrounding whitespace is ignored; `"1."` and `".5"` are accepted.
pub fn normalize(input: &str, decimals: u8) -> Result<U256, SwapError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(SwapError::invalid_amount(input, "amount is empty"));
    }
    if raw.starts_with('-') {
        return Err(SwapError::invalid_amount(input, "amount must not be negative"));
    }

    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(SwapError::invalid_amount(input, "amount has no digits"));
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(SwapError::invalid_amount(input, "not a decimal number"));
    }
    if fraction.len() > decimals as usize {
        return Err(SwapError::invalid_amount(
            input,
            format!("more than {decimals} fractional digits"),
        ));
    }

    let scaled = format!("{whole}{fraction:0<width$}", width = decimals as usize);
    let digits = scaled.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits)
        .map_err(|_| SwapError::invalid_amount(input, "amount exceeds uint256 range"))
}

/// Exact inverse of [`normalize`]: `amount / 10^decimals` as a decimal.
pub fn to_decimal(amount: U256, decimals: u8) -> BigDecimal {
    let mut bytes = [0u8; 32];
    amount.to_big_endian(&mut bytes);
    BigDecimal::new(BigInt::from_bytes_be(Sign::Plus, &bytes), i64::from(decimals))
}

/// Render a fixed-point amount for display, trimming trailing fractional zeros.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let divisor = U256::exp10(decimals as usize);
    let whole = amount / divisor;
    let fractional = amount % divisor;
    if fractional.is_zero() {
        return whole.to_string();
    }
    let padded = format!("{:0>width$}", fractional.to_string(), width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}
