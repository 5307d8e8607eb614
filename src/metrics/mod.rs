//! Shared fee pipeline used by every adapter:
//!
//! - [`fetcher`] - batched snapshot query at three block heights
//! - [`joiner`] - merge snapshots into per-entity records
//! - [`normalizer`] - USD conversion with lookback-matched prices
//! - [`reducer`] - `oneDay` and `sevenDayMA`

pub mod fetcher;
pub mod joiner;
pub mod normalizer;
pub mod reducer;

pub use fetcher::{fetch_snapshots, SnapshotQuery};
pub use joiner::{join, merge_maps, EntityMap};
pub use normalizer::{PriceTable, Window, WindowPrices};
pub use reducer::{reduce, FeeTotals, MOVING_AVERAGE_DAYS};
