//! Omen: USD volume per market maker times its on-chain fee.

use serde::Deserialize;

use crate::adapters::adapter::SubgraphProtocol;
use crate::error::{FeeError, Result};
use crate::metrics::SnapshotQuery;
use crate::models::{Category, EntityRecord, ProtocolMeta};
use crate::utils::{decimal_str_to_f64, fixed_point_to_f64, validate_fee_rate};

pub const DEFAULT_ENDPOINT: &str = "https://api.thegraph.com/subgraphs/name/gnosis/omen";

/// `fee` is a wad (18-decimal fixed point).
pub const FEE_RATE_DECIMALS: u8 = 18;

/// Subgraph page size; Omen has fewer markets than this per snapshot.
const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedProductMarketMaker {
    pub id: String,
    pub fee: String,
    pub usd_volume: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Omen;

impl SubgraphProtocol for Omen {
    type Entity = FixedProductMarketMaker;

    const META: ProtocolMeta = ProtocolMeta {
        id: "omen",
        name: "Omen",
        category: Category::Dex,
        description: "Omen is a prediction market.",
        fee_description: "Trading fees are paid by traders to liquidity providers.",
        blockchain: "Ethereum",
        source: "The Graph Protocol",
        adapter: "omen",
    };

    fn snapshot_query(&self) -> SnapshotQuery {
        SnapshotQuery {
            collection: "fixedProductMarketMakers",
            selection: "id fee usdVolume",
            first: Some(PAGE_SIZE),
        }
    }

    fn extract(&self, market: FixedProductMarketMaker) -> Result<EntityRecord> {
        let volume = decimal_str_to_f64(&market.usd_volume).ok_or_else(|| {
            FeeError::Schema(format!(
                "market {}: usdVolume {:?} is not a decimal",
                market.id, market.usd_volume
            ))
        })?;

        let rate = fixed_point_to_f64(&market.fee, FEE_RATE_DECIMALS)
            .and_then(validate_fee_rate)
            .ok_or_else(|| {
                FeeError::Schema(format!(
                    "market {}: fee {:?} is not an 18-decimal rate",
                    market.id, market.fee
                ))
            })?;

        Ok(EntityRecord::usd(market.id, volume, Some(rate)))
    }
}
