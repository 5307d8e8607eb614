//! mStable: cumulative fees per mAsset, mBTC priced in bitcoin.

use serde::Deserialize;

use crate::adapters::adapter::SubgraphProtocol;
use crate::error::{FeeError, Result};
use crate::metrics::SnapshotQuery;
use crate::models::{Category, Denomination, EntityRecord, ProtocolMeta};
use crate::utils::decimal_str_to_f64;

pub const DEFAULT_ENDPOINT: &str =
    "https://api.thegraph.com/subgraphs/name/mstable/mstable-protocol";

/// mAsset whose fees are denominated in BTC rather than USD.
const BTC_MASSET_SYMBOL: &str = "mBTC";
const BTC_ORACLE_ID: &str = "bitcoin";

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metric {
    pub simple: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Masset {
    pub id: String,
    pub token: Token,
    pub cumulative_fees_paid: Metric,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MStable;

impl SubgraphProtocol for MStable {
    type Entity = Masset;

    const META: ProtocolMeta = ProtocolMeta {
        id: "mstable",
        name: "mStable",
        category: Category::Dex,
        description: "mStable is a stablecoin asset manager.",
        fee_description: "Trading fees are paid by traders to liquidity providers",
        blockchain: "Ethereum",
        source: "The Graph Protocol",
        adapter: "mStable",
    };

    fn snapshot_query(&self) -> SnapshotQuery {
        SnapshotQuery {
            collection: "massets",
            selection: "id token { symbol } cumulativeFeesPaid { simple }",
            first: None,
        }
    }

    fn priced_assets(&self) -> &'static [&'static str] {
        &[BTC_ORACLE_ID]
    }

    fn extract(&self, masset: Masset) -> Result<EntityRecord> {
        let fees = decimal_str_to_f64(&masset.cumulative_fees_paid.simple).ok_or_else(|| {
            FeeError::Schema(format!(
                "mAsset {}: cumulativeFeesPaid.simple {:?} is not a decimal",
                masset.id, masset.cumulative_fees_paid.simple
            ))
        })?;

        let denomination = if masset.token.symbol == BTC_MASSET_SYMBOL {
            Denomination::Asset(BTC_ORACLE_ID.to_string())
        } else {
            Denomination::Usd
        };

        Ok(EntityRecord {
            id: masset.id,
            value: fees,
            rate: None,
            denomination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn masset(id: &str, symbol: &str, simple: &str) -> Masset {
        serde_json::from_value(json!({
            "id": id,
            "token": { "symbol": symbol },
            "cumulativeFeesPaid": { "simple": simple },
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_usd_masset() {
        let record = MStable.extract(masset("0xe2f2", "mUSD", "1523.75")).unwrap();
        assert_eq!(record, EntityRecord::usd("0xe2f2", 1523.75, None));
    }

    #[test]
    fn test_extract_btc_masset_is_priced() {
        let record = MStable.extract(masset("0x9456", "mBTC", "0.5")).unwrap();
        assert_eq!(
            record.denomination,
            Denomination::Asset("bitcoin".to_string())
        );
        assert_eq!(record.rate, None);
    }

    #[test]
    fn test_extract_rejects_bad_amount() {
        let err = MStable.extract(masset("0x1", "mUSD", "n/a")).unwrap_err();
        assert!(matches!(err, FeeError::Schema(_)));
    }

    #[test]
    fn test_missing_nested_field_fails_to_parse() {
        let parsed: std::result::Result<Masset, _> = serde_json::from_value(json!({
            "id": "0x1",
            "token": { "symbol": "mUSD" },
        }));
        assert!(parsed.is_err());
    }
}
