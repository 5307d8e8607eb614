//! Sanity bounds for values coming from external collaborators.
//!
//! 1. ORACLE PRICE: no tracked asset costs more than $1M per unit. A larger average
//!    price means the oracle answered for the wrong asset or in the wrong unit.
//!
//! 2. FEE RATE: a fee is a fraction of volume, so anything outside [0, 1] after
//!    fixed-point scaling is a decoding error (usually a wrong scale constant).

// ============================================
// Bounds
// ============================================

/// Maximum reasonable asset price in USD.
pub const MAX_TOKEN_USD_PRICE: f64 = 1e6;

/// Upper bound for a scaled fee rate.
pub const MAX_FEE_RATE: f64 = 1.0;

// ============================================
// Validation Helpers
// ============================================

/// Validate a USD price is within reasonable bounds.
/// Returns Some(price) if valid, None if invalid.
#[inline]
pub fn validate_usd_price(price: f64) -> Option<f64> {
    if price > 0.0 && price.is_finite() && price <= MAX_TOKEN_USD_PRICE {
        Some(price)
    } else {
        None
    }
}

/// Validate a scaled fee rate.
#[inline]
pub fn validate_fee_rate(rate: f64) -> Option<f64> {
    if rate.is_finite() && (0.0..=MAX_FEE_RATE).contains(&rate) {
        Some(rate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_price_bounds() {
        assert_eq!(validate_usd_price(64_000.0), Some(64_000.0));
        assert_eq!(validate_usd_price(0.0), None);
        assert_eq!(validate_usd_price(f64::NAN), None);
        assert_eq!(validate_usd_price(2e6), None);
    }

    #[test]
    fn test_fee_rate_bounds() {
        assert_eq!(validate_fee_rate(0.003), Some(0.003));
        assert_eq!(validate_fee_rate(0.0), Some(0.0));
        // unscaled 18-decimal value slipped through
        assert_eq!(validate_fee_rate(3e15), None);
        assert_eq!(validate_fee_rate(-0.1), None);
    }
}
