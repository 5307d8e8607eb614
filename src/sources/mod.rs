//! External collaborators: indexed data source, block resolver, price oracle.
//!
//! Each is a trait so adapters can be exercised against stubs; the concrete
//! types here are what the binary wires up from [`crate::Settings`].

pub mod blocks;
pub mod graph;
pub mod prices;

pub use blocks::{resolve_heights, BlockResolver, EstimatedBlockResolver, SubgraphBlockResolver};
pub use graph::{GraphRequest, GraphTransport, HttpGraphClient};
pub use prices::{CoinGeckoOracle, PriceOracle};
