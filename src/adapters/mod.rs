//! Protocol adapters and the registry that exposes them.
//!
//! Every adapter implements [`FeeAdapter`]. Subgraph-backed protocols only supply a
//! [`SubgraphProtocol`] strategy ([`mstable::MStable`], [`omen::Omen`]) and share the
//! pipeline in [`crate::metrics`].

pub mod adapter;
pub mod mstable;
pub mod omen;

use std::time::Instant;

use futures::future::join_all;
use log::{info, warn};
use url::Url;

use crate::config::{AdapterSettings, AdaptersSettings};
use crate::error::{FeeError, Result};
use crate::models::FeeMetrics;

pub use adapter::{AdapterContext, FeeAdapter, SubgraphAdapter, SubgraphProtocol};
pub use mstable::MStable;
pub use omen::Omen;

/// Ordered set of adapters keyed by protocol id.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn FeeAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the enabled adapters with their configured endpoints.
    pub fn from_settings(settings: &AdaptersSettings) -> anyhow::Result<Self> {
        let mut registry = Self::new();

        if let Some(endpoint) = enabled_endpoint("mstable", &settings.mstable)? {
            registry.register(SubgraphAdapter::new(MStable, endpoint));
        }
        if let Some(endpoint) = enabled_endpoint("omen", &settings.omen)? {
            registry.register(SubgraphAdapter::new(Omen, endpoint));
        }

        info!("Registered {} fee adapters: {:?}", registry.len(), registry.ids());
        Ok(registry)
    }

    /// Add an adapter. A later adapter with the same id replaces the earlier one.
    pub fn register(&mut self, adapter: impl FeeAdapter + 'static) {
        let id = adapter.meta().id;
        if let Some(pos) = self.adapters.iter().position(|a| a.meta().id == id) {
            warn!("Replacing adapter {}", id);
            self.adapters[pos] = Box::new(adapter);
        } else {
            self.adapters.push(Box::new(adapter));
        }
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.meta().id).collect()
    }

    pub fn get(&self, id: &str) -> Option<&dyn FeeAdapter> {
        self.adapters
            .iter()
            .find(|a| a.meta().id == id)
            .map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Compute one protocol's metrics.
    pub async fn compute(&self, id: &str, ctx: &AdapterContext<'_>) -> Result<FeeMetrics> {
        let adapter = self
            .get(id)
            .ok_or_else(|| FeeError::UnknownProtocol(id.to_string()))?;
        adapter.compute_fee_metrics(ctx).await
    }

    /// Compute every protocol concurrently.
    ///
    /// Results keep registration order. One adapter failing has no effect on the
    /// others; each entry is either a complete `FeeMetrics` or that adapter's error.
    pub async fn compute_all(
        &self,
        ctx: &AdapterContext<'_>,
    ) -> Vec<(&'static str, Result<FeeMetrics>)> {
        let start = Instant::now();

        let results = join_all(self.adapters.iter().map(|adapter| async move {
            (adapter.meta().id, adapter.compute_fee_metrics(ctx).await)
        }))
        .await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            "Computed {} adapters in {:?} ({} failed)",
            results.len(),
            start.elapsed(),
            failed
        );
        results
    }
}

fn enabled_endpoint(id: &str, settings: &AdapterSettings) -> anyhow::Result<Option<Url>> {
    if !settings.enabled {
        warn!("Adapter {} is disabled in configuration", id);
        return Ok(None);
    }
    let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
        anyhow::anyhow!("invalid endpoint for adapter {}: {:?} ({})", id, settings.endpoint, e)
    })?;
    Ok(Some(endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockHeights, Category, ProtocolMeta};
    use crate::sources::graph::{GraphRequest, GraphTransport};
    use crate::sources::prices::PriceOracle;
    use async_trait::async_trait;
    use serde_json::Value;

    struct NoTransport;

    #[async_trait]
    impl GraphTransport for NoTransport {
        async fn post(&self, endpoint: &Url, _request: &GraphRequest) -> Result<Value> {
            Err(FeeError::transport(endpoint.as_str(), "offline"))
        }
    }

    struct NoOracle;

    #[async_trait]
    impl PriceOracle for NoOracle {
        async fn avg_price(&self, asset: &str, days_ago: u32) -> Result<f64> {
            Err(FeeError::price_lookup(asset, days_ago, "offline"))
        }
    }

    struct Constant(ProtocolMeta, f64);

    #[async_trait]
    impl FeeAdapter for Constant {
        fn meta(&self) -> ProtocolMeta {
            self.0
        }

        async fn compute_fee_metrics(&self, _ctx: &AdapterContext<'_>) -> Result<FeeMetrics> {
            Ok(FeeMetrics::new(&self.0, self.1, self.1 / 7.0))
        }
    }

    const STUB: ProtocolMeta = ProtocolMeta {
        id: "stub",
        name: "Stub",
        category: Category::Other,
        description: "",
        fee_description: "",
        blockchain: "Ethereum",
        source: "test",
        adapter: "stub",
    };

    fn ctx() -> AdapterContext<'static> {
        AdapterContext::new(&NoTransport, &NoOracle, BlockHeights::new(3, 2, 1))
    }

    #[test]
    fn test_from_default_settings() {
        let registry = AdapterRegistry::from_settings(&AdaptersSettings::default()).unwrap();
        assert_eq!(registry.ids(), vec!["mstable", "omen"]);
        assert!(registry.get("omen").is_some());
        assert!(registry.get("uniswap").is_none());
    }

    #[test]
    fn test_disabled_and_invalid_endpoints() {
        let mut settings = AdaptersSettings::default();
        settings.mstable.enabled = false;
        let registry = AdapterRegistry::from_settings(&settings).unwrap();
        assert_eq!(registry.ids(), vec!["omen"]);

        settings.omen.endpoint = "not a url".to_string();
        assert!(AdapterRegistry::from_settings(&settings).is_err());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = AdapterRegistry::new();
        registry.register(Constant(STUB, 1.0));
        registry.register(Constant(STUB, 2.0));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_compute_unknown_protocol() {
        let registry = AdapterRegistry::new();
        let err = registry.compute("nope", &ctx()).await.unwrap_err();
        assert!(matches!(err, FeeError::UnknownProtocol(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_compute_all_isolates_failures() {
        let mut registry = AdapterRegistry::from_settings(&AdaptersSettings::default()).unwrap();
        registry.register(Constant(STUB, 7.0));

        let results = registry.compute_all(&ctx()).await;
        let ids: Vec<_> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["mstable", "omen", "stub"]);

        // mstable needs both the subgraph and the oracle, either may fail first
        assert!(results[0].1.is_err());
        assert!(matches!(results[1].1, Err(FeeError::Transport { .. })));
        let stub = results[2].1.as_ref().unwrap();
        assert_eq!(stub.one_day, 7.0);
        assert_eq!(stub.seven_day_ma, 1.0);
    }
}
