//! Stub collaborators shared by unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::adapters::{AdapterContext, AdapterRegistry, FeeAdapter};
use crate::config::BlockSettings;
use crate::error::{FeeError, Result};
use crate::models::{Category, FeeMetrics, ProtocolMeta};
use crate::service::FeeService;
use crate::sources::{GraphRequest, GraphTransport, PriceOracle};

/// Transport and oracle that always fail.
pub struct Offline;

#[async_trait]
impl GraphTransport for Offline {
    async fn post(&self, endpoint: &Url, _request: &GraphRequest) -> Result<Value> {
        Err(FeeError::transport(endpoint.as_str(), "offline"))
    }
}

#[async_trait]
impl PriceOracle for Offline {
    async fn avg_price(&self, asset: &str, days_ago: u32) -> Result<f64> {
        Err(FeeError::price_lookup(asset, days_ago, "offline"))
    }
}

/// Adapter returning `oneDay = v`, `sevenDayMA = v / 7`, or a schema error for `None`.
pub struct Fixed(pub ProtocolMeta, pub Option<f64>);

#[async_trait]
impl FeeAdapter for Fixed {
    fn meta(&self) -> ProtocolMeta {
        self.0
    }

    async fn compute_fee_metrics(&self, _ctx: &AdapterContext<'_>) -> Result<FeeMetrics> {
        match self.1 {
            Some(v) => Ok(FeeMetrics::new(&self.0, v, v / 7.0)),
            None => Err(FeeError::Schema("bad record".to_string())),
        }
    }
}

pub fn meta(id: &'static str) -> ProtocolMeta {
    ProtocolMeta {
        id,
        name: id,
        category: Category::Other,
        description: "",
        fee_description: "",
        blockchain: "Ethereum",
        source: "test",
        adapter: id,
    }
}

/// Service with offline collaborators, estimated block heights and `adapters`.
pub fn fixed_service(adapters: Vec<Fixed>) -> FeeService {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    FeeService::new(
        Arc::new(Offline),
        Arc::new(Offline),
        BlockSettings::Estimate {
            anchor_block: 1_000_000,
            anchor_timestamp: 1_700_000_000,
            block_time_secs: 12.0,
        },
        registry,
    )
}
