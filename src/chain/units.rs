//! Decimal amount conversion
//!
//! Exact string arithmetic so "0.0001" becomes 100_000 lamports rather than
//! whatever a float multiply rounds to.

use crate::error::{Error, Result};

/// Decimals of native SOL (1 SOL = 1_000_000_000 lamports)
pub const SOL_DECIMALS: u8 = 9;

/// Parse a decimal string in native units into base units
pub fn parse_units(value: &str, decimals: u8) -> Result<u128> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidAmount("empty amount".into()));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(Error::InvalidAmount(format!("not a number: {}", value)));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(Error::InvalidAmount(format!("not a non-negative decimal: {}", value)));
    }
    if fraction.len() > decimals as usize {
        return Err(Error::InvalidAmount(format!(
            "{} has more than {} decimal places",
            value, decimals
        )));
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| Error::InvalidAmount(format!("unsupported decimals: {}", decimals)))?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| Error::InvalidAmount(format!("amount too large: {}", value)))?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| Error::InvalidAmount(format!("invalid fraction: {}", value)))?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or_else(|| Error::InvalidAmount(format!("amount too large: {}", value)))
}

/// Render base units as a decimal string in native units
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let scale = match 10u128.checked_pow(decimals as u32) {
        Some(s) => s,
        None => return amount.to_string(),
    };

    let whole = amount / scale;
    let fraction = amount % scale;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
