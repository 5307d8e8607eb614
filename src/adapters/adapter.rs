//! Generic subgraph adapter.
//!
//! A protocol only describes *what* to read and how to interpret one record
//! ([`SubgraphProtocol`]); fetching, joining, pricing and reduction are shared.

use std::time::Instant;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Result;
use crate::metrics::{fetch_snapshots, join, reduce, PriceTable, SnapshotQuery};
use crate::models::{BlockHeights, EntityRecord, FeeMetrics, ProtocolMeta};
use crate::sources::{GraphTransport, PriceOracle};

/// Everything an adapter call needs from the outside, passed explicitly.
#[derive(Clone, Copy)]
pub struct AdapterContext<'a> {
    pub transport: &'a dyn GraphTransport,
    pub oracle: &'a dyn PriceOracle,
    pub heights: BlockHeights,
}

impl<'a> AdapterContext<'a> {
    pub fn new(
        transport: &'a dyn GraphTransport,
        oracle: &'a dyn PriceOracle,
        heights: BlockHeights,
    ) -> Self {
        Self {
            transport,
            oracle,
            heights,
        }
    }
}

/// Uniform public contract: one call, one complete [`FeeMetrics`] or an error.
#[async_trait]
pub trait FeeAdapter: Send + Sync {
    fn meta(&self) -> ProtocolMeta;

    async fn compute_fee_metrics(&self, ctx: &AdapterContext<'_>) -> Result<FeeMetrics>;
}

/// Per-protocol strategy: entity shape and extraction rule.
pub trait SubgraphProtocol: Send + Sync {
    /// Strict response shape of one snapshot record.
    type Entity: DeserializeOwned + Send;

    const META: ProtocolMeta;

    fn snapshot_query(&self) -> SnapshotQuery;

    /// Oracle asset ids this protocol may need; fetched up front, concurrently
    /// with the snapshots.
    fn priced_assets(&self) -> &'static [&'static str] {
        &[]
    }

    /// Turn one raw record into `(id, value, rate, denomination)`.
    fn extract(&self, entity: Self::Entity) -> Result<EntityRecord>;
}

/// A [`SubgraphProtocol`] bound to its endpoint.
pub struct SubgraphAdapter<P> {
    protocol: P,
    endpoint: Url,
}

impl<P: SubgraphProtocol> SubgraphAdapter<P> {
    pub fn new(protocol: P, endpoint: Url) -> Self {
        Self { protocol, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl<P: SubgraphProtocol> FeeAdapter for SubgraphAdapter<P> {
    fn meta(&self) -> ProtocolMeta {
        P::META
    }

    async fn compute_fee_metrics(&self, ctx: &AdapterContext<'_>) -> Result<FeeMetrics> {
        let start = Instant::now();
        let query = self.protocol.snapshot_query();

        let (snapshots, prices) = tokio::try_join!(
            fetch_snapshots::<P::Entity>(ctx.transport, &self.endpoint, &query, &ctx.heights),
            PriceTable::fetch(ctx.oracle, self.protocol.priced_assets()),
        )?;

        if snapshots.is_empty() {
            warn!("{}: {} returned no entities", P::META.id, self.endpoint());
        }

        let records = snapshots.try_map(|entity| self.protocol.extract(entity))?;
        let entities = join(records);
        let totals = reduce(&entities, &prices)?;

        debug!(
            "{}: {} entities, {} in oneDay, {} in sevenDayMA",
            P::META.id,
            entities.len(),
            totals.one_day_entities,
            totals.seven_day_entities
        );
        info!(
            "Computed fees for {} in {:?} (oneDay={:.2}, sevenDayMA={:.2})",
            P::META.name,
            start.elapsed(),
            totals.one_day,
            totals.seven_day_ma
        );

        Ok(FeeMetrics::new(&P::META, totals.one_day, totals.seven_day_ma))
    }
}
