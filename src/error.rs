//! Error taxonomy for fee metric computation.
//!
//! Every variant is terminal for the adapter call that produced it: adapters never
//! recover locally and never return a partially filled [`crate::FeeMetrics`].
//! Entities missing a time point are not errors; the reducer skips them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeeError {
    /// Network/HTTP failure, or a response body that is not well-formed.
    #[error("transport error from {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Well-formed response that lacks an expected field or has the wrong shape.
    #[error("schema error: {0}")]
    Schema(String),

    /// `transient` is set only when the oracle itself could not be reached or was
    /// overloaded; a bad answer or a missing asset is not.
    #[error("price lookup failed for {asset} ({days_ago}d): {reason}")]
    PriceLookup {
        asset: String,
        days_ago: u32,
        reason: String,
        transient: bool,
    },

    #[error("block lookup failed ({days_ago}d ago): {reason}")]
    BlockLookup { days_ago: u32, reason: String },

    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),
}

impl FeeError {
    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        FeeError::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn price_lookup(asset: &str, days_ago: u32, reason: impl ToString) -> Self {
        FeeError::PriceLookup {
            asset: asset.to_string(),
            days_ago,
            reason: reason.to_string(),
            transient: false,
        }
    }

    /// Oracle unreachable or overloaded.
    pub fn price_unavailable(asset: &str, days_ago: u32, reason: impl ToString) -> Self {
        FeeError::PriceLookup {
            asset: asset.to_string(),
            days_ago,
            reason: reason.to_string(),
            transient: true,
        }
    }

    /// True for failures a caller may reasonably retry later (network level).
    pub fn is_transient(&self) -> bool {
        match self {
            FeeError::Transport { .. } => true,
            FeeError::PriceLookup { transient, .. } => *transient,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = FeeError::price_lookup("bitcoin", 7, "empty series");
        assert_eq!(
            err.to_string(),
            "price lookup failed for bitcoin (7d): empty series"
        );

        let err = FeeError::transport("https://example.org/graph", "status 502");
        assert!(err.to_string().contains("https://example.org/graph"));
    }

    #[test]
    fn test_schema_errors_are_not_transient() {
        assert!(!FeeError::Schema("missing field `fee`".into()).is_transient());
        assert!(FeeError::transport("x", "timeout").is_transient());
    }

    #[test]
    fn test_only_unreachable_oracle_is_transient() {
        assert!(!FeeError::price_lookup("bitcoin", 1, "asset was not prefetched").is_transient());
        assert!(!FeeError::price_lookup("bitcoin", 7, "implausible price NaN").is_transient());
        assert!(FeeError::price_unavailable("bitcoin", 1, "status 503").is_transient());

        // same message either way
        assert_eq!(
            FeeError::price_unavailable("bitcoin", 7, "empty series").to_string(),
            FeeError::price_lookup("bitcoin", 7, "empty series").to_string()
        );
    }
}
