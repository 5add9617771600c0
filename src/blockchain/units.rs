//! Conversion between user-facing decimal amounts and wei.
//!
//! Amounts are parsed once, exactly, at the input boundary. Everything past
//! this module works in integer wei.

use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use thiserror::Error;

/// Decimals of the native currency.
pub const ETHER_DECIMALS: u8 = 18;

/// Decimals of a gwei relative to wei.
pub const GWEI_DECIMALS: u8 = 9;

/// Why an amount string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a plain decimal number")]
    Malformed(String),

    #[error("'{input}' has {digits} fractional digits, at most 18 are supported")]
    TooPrecise { input: String, digits: usize },

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("'{0}' is too large")]
    Overflow(String),
}

/// Parse a decimal amount of whole units (e.g. `"0.1"`) into wei.
///
/// Accepts digits with at most one `.`; signs, exponents and separators are
/// rejected so no rounding ever happens.
pub fn parse_amount(input: &str) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(AmountError::Malformed(trimmed.to_string()));
    }

    if frac_part.len() > ETHER_DECIMALS as usize {
        return Err(AmountError::TooPrecise {
            input: trimmed.to_string(),
            digits: frac_part.len(),
        });
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let normalized = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };

    let wei: U256 = parse_units(&normalized, ETHER_DECIMALS)
        .map_err(|_| AmountError::Overflow(trimmed.to_string()))?
        .into();

    if wei.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(wei)
}

/// Format wei as whole units, e.g. `1000000000000000000` → `"1.0"`.
pub fn format_ether(wei: U256) -> String {
    format_trimmed(wei, ETHER_DECIMALS)
}

/// Format wei as gwei, e.g. `20000000000` → `"20.0"`.
pub fn format_gwei(wei: U256) -> String {
    format_trimmed(wei, GWEI_DECIMALS)
}

/// Exact decimal rendering with trailing zeros removed, keeping one
/// fractional digit.
fn format_trimmed(value: U256, decimals: u8) -> String {
    let mut formatted = match format_units(value, decimals) {
        Ok(s) => s,
        Err(_) => return value.to_string(),
    };

    if !formatted.contains('.') {
        formatted.push_str(".0");
        return formatted;
    }

    let keep = formatted.trim_end_matches('0').len();
    formatted.truncate(keep);
    if formatted.ends_with('.') {
        formatted.push('0');
    }
    formatted
}
