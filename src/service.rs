//! Wiring of the collaborators into one refresh.
//!
//! A [`FeeService`] owns the transport, the price oracle and the registry. Each
//! refresh builds a fresh block resolver (so "now" is captured once per refresh),
//! resolves the three comparison heights and hands one [`AdapterContext`] to the
//! adapters.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use url::Url;

use crate::adapters::{AdapterContext, AdapterRegistry};
use crate::config::{BlockSettings, Settings};
use crate::error::Result;
use crate::models::{BlockHeights, FeeMetrics};
use crate::sources::{
    resolve_heights, BlockResolver, CoinGeckoOracle, EstimatedBlockResolver, GraphTransport,
    HttpGraphClient, PriceOracle, SubgraphBlockResolver,
};

pub struct FeeService {
    transport: Arc<dyn GraphTransport>,
    oracle: Arc<dyn PriceOracle>,
    blocks: BlockSettings,
    registry: AdapterRegistry,
}

impl FeeService {
    pub fn new(
        transport: Arc<dyn GraphTransport>,
        oracle: Arc<dyn PriceOracle>,
        blocks: BlockSettings,
        registry: AdapterRegistry,
    ) -> Self {
        Self {
            transport,
            oracle,
            blocks,
            registry,
        }
    }

    /// Build the HTTP client, the CoinGecko oracle and the enabled adapters.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(settings.http.timeout_secs);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = Url::parse(&settings.prices.base_url)
            .with_context(|| format!("Invalid price oracle url {:?}", settings.prices.base_url))?;

        let oracle = CoinGeckoOracle::new(
            http.clone(),
            base_url,
            Duration::from_secs(settings.prices.cache_ttl_secs),
        );
        let registry = AdapterRegistry::from_settings(&settings.adapters)?;

        Ok(Self::new(
            Arc::new(HttpGraphClient::from_client(http)),
            Arc::new(oracle),
            settings.blocks.clone(),
            registry,
        ))
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Resolver anchored at the current instant.
    pub fn block_resolver(&self) -> anyhow::Result<Box<dyn BlockResolver>> {
        self.block_resolver_at(Utc::now())
    }

    pub fn block_resolver_at(&self, now: DateTime<Utc>) -> anyhow::Result<Box<dyn BlockResolver>> {
        match &self.blocks {
            BlockSettings::Subgraph { url } => {
                let endpoint = Url::parse(url)
                    .with_context(|| format!("Invalid blocks subgraph url {:?}", url))?;
                Ok(Box::new(SubgraphBlockResolver::at(
                    self.transport.clone(),
                    endpoint,
                    now,
                )))
            }
            BlockSettings::Estimate {
                anchor_block,
                anchor_timestamp,
                block_time_secs,
            } => {
                let anchor_time =
                    DateTime::from_timestamp(*anchor_timestamp, 0).ok_or_else(|| {
                        anyhow!("anchor_timestamp {} is out of range", anchor_timestamp)
                    })?;
                Ok(Box::new(EstimatedBlockResolver::new(
                    *anchor_block,
                    anchor_time,
                    *block_time_secs,
                    now,
                )))
            }
        }
    }

    pub async fn resolve_heights(&self) -> anyhow::Result<BlockHeights> {
        let resolver = self.block_resolver()?;
        let heights = resolve_heights(resolver.as_ref())
            .await
            .context("Failed to resolve block heights")?;
        Ok(heights)
    }

    fn context(&self, heights: BlockHeights) -> AdapterContext<'_> {
        AdapterContext::new(self.transport.as_ref(), self.oracle.as_ref(), heights)
    }

    /// Metrics of one protocol at freshly resolved heights.
    pub async fn compute(&self, id: &str) -> anyhow::Result<FeeMetrics> {
        let heights = self.resolve_heights().await?;
        let metrics = self
            .registry
            .compute(id, &self.context(heights))
            .await
            .with_context(|| format!("Failed to compute fees for {}", id))?;
        Ok(metrics)
    }

    /// Metrics of every registered protocol at one shared set of heights.
    ///
    /// Only block resolution is fatal; per-adapter failures are returned as is.
    pub async fn compute_all(&self) -> anyhow::Result<Vec<(&'static str, Result<FeeMetrics>)>> {
        let heights = self.resolve_heights().await?;
        Ok(self.registry.compute_all(&self.context(heights)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Offline;
    use chrono::TimeZone;

    fn service(blocks: BlockSettings) -> FeeService {
        FeeService::new(
            Arc::new(Offline),
            Arc::new(Offline),
            blocks,
            AdapterRegistry::new(),
        )
    }

    #[tokio::test]
    async fn test_estimate_resolver_from_settings() {
        let anchor = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let service = service(BlockSettings::Estimate {
            anchor_block: 100,
            anchor_timestamp: anchor.timestamp(),
            block_time_secs: 12.0,
        });

        let resolver = service
            .block_resolver_at(anchor + chrono::Duration::days(8))
            .unwrap();
        let heights = resolve_heights(resolver.as_ref()).await.unwrap();

        assert_eq!(heights, BlockHeights::new(57_700, 50_500, 7_300));
    }

    #[tokio::test]
    async fn test_subgraph_resolver_failure_is_fatal() {
        let service = service(BlockSettings::default());
        let err = service.compute_all().await.unwrap_err();
        assert!(err.to_string().contains("block heights"));
    }

    #[test]
    fn test_invalid_blocks_url() {
        let service = service(BlockSettings::Subgraph {
            url: "nope".to_string(),
        });
        assert!(service.block_resolver().is_err());
    }
}
