//! Conversion between human decimal amounts and the 18-decimal fixed-point
//! integers the exchange contracts take.

use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// All exchange amounts are scaled by 10^18.
pub const UNIT_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Parses a human decimal string into the contract unit.
///
/// Accepts base-10 decimals with up to 18 fractional digits. Negative,
/// non-numeric, and over-precise input is rejected; no scientific notation.
pub fn parse_units(amount: &str) -> Result<U256, CodecError> {
    let trimmed = amount.trim();

    let parsed = Decimal::from_str(trimmed)
        .map_err(|e| CodecError::InvalidAmount(format!("{trimmed:?}: {e}")))?;

    if parsed.is_sign_negative() {
        return Err(CodecError::InvalidAmount(format!(
            "{trimmed:?}: amount cannot be negative"
        )));
    }

    let canonical = parsed.normalize();
    if canonical.scale() > UNIT_DECIMALS {
        return Err(CodecError::InvalidAmount(format!(
            "{trimmed:?}: more than {UNIT_DECIMALS} decimal places"
        )));
    }

    // Scale by string manipulation so amounts near Decimal's upper range
    // don't overflow a mantissa multiplication.
    let rendered = canonical.to_string();
    let (whole, fraction) = rendered
        .split_once('.')
        .unwrap_or((rendered.as_str(), ""));
    let scaled = format!("{whole}{fraction:0<width$}", width = UNIT_DECIMALS as usize);

    U256::from_str_radix(&scaled, 10)
        .map_err(|e| CodecError::InvalidAmount(format!("{trimmed:?}: {e}")))
}

/// Renders a contract-unit value as a canonical decimal string, trailing
/// zeros trimmed.
pub fn format_units(value: U256) -> String {
    let divisor = U256::from(10u64).pow(U256::from(UNIT_DECIMALS));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let padded = format!(
            "{:0>width$}",
            remainder.to_string(),
            width = UNIT_DECIMALS as usize
        );
        format!("{whole}.{}", padded.trim_end_matches('0'))
    }
}

/// Minimum acceptable output for a quoted output and a slippage tolerance:
/// `quoted * (100 - slippage) / 100`, truncating.
///
/// Slippage is a percentage; values outside `[0, 100)` are the caller's to
/// reject — a tolerance of 100 or more collapses the minimum to zero here.
pub fn min_output_after_slippage(quoted: U256, slippage: Decimal) -> U256 {
    let keep = Decimal::ONE_HUNDRED - slippage;
    if keep <= Decimal::ZERO {
        return U256::ZERO;
    }

    let numerator = U256::from(keep.mantissa().unsigned_abs());
    let denominator = U256::from(100u64) * U256::from(10u64).pow(U256::from(keep.scale()));

    match quoted.checked_mul(numerator) {
        Some(scaled) => scaled / denominator,
        // Out of multiplication range; divide first and accept the rounding.
        None => (quoted / denominator) * numerator,
    }
}
