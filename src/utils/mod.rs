//! Utility functions for feewatch.
//!
//! - [`validation`] - Sanity bounds for oracle prices and fee rates
//! - [`conversion`] - Numeric string parsing with exact decimal scaling

mod conversion;
mod validation;

// ============================================
// Re-exports
// ============================================

// Conversion utilities
pub use conversion::{decimal_str_to_f64, fixed_point_to_f64, str_to_f64_with_decimals};

// Validation utilities
pub use validation::{validate_fee_rate, validate_usd_price, MAX_FEE_RATE, MAX_TOKEN_USD_PRICE};
