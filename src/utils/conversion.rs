//! Numeric string conversions.
//!
//! Subgraphs serialize `BigInt` and `BigDecimal` fields as strings. These helpers parse
//! them with exact decimal arithmetic and only convert to f64 at the end, so an
//! 18-decimal fixed-point value does not lose precision before it is scaled.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;
use std::str::FromStr;

// ============================================
// String to f64 Conversions
// ============================================

/// Parse a string representation of a large number to f64 with decimal adjustment.
///
/// # Arguments
/// * `value_str` - The string representation of the number
/// * `decimals` - The number of decimal places to adjust by
///
/// # Returns
/// * `Some(f64)` if parsing succeeds and value is valid, `None` otherwise
pub fn str_to_f64_with_decimals(value_str: &str, decimals: u8) -> Option<f64> {
    let big_value = BigDecimal::from_str(value_str.trim()).ok()?;

    let adjusted = if decimals == 0 {
        big_value
    } else {
        big_value / big_pow10(decimals)
    };

    let result = adjusted.to_f64()?;

    if result.is_finite() && result >= 0.0 {
        Some(result)
    } else {
        None
    }
}

/// Parse a plain decimal string (e.g. a subgraph `BigDecimal` such as `"1234.56"`).
#[inline]
pub fn decimal_str_to_f64(value_str: &str) -> Option<f64> {
    str_to_f64_with_decimals(value_str, 0)
}

/// Parse an on-chain fixed-point integer string into a fraction.
///
/// `fixed_point_to_f64("3000000000000000", 18)` is `0.003`. Fractional input is
/// rejected since fixed-point values are integers by construction.
pub fn fixed_point_to_f64(value_str: &str, decimals: u8) -> Option<f64> {
    let raw = BigInt::from_str(value_str.trim()).ok()?;
    str_to_f64_with_decimals(&raw.to_string(), decimals)
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}
