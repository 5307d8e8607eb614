//! Block-height-from-timestamp resolution.
//!
//! Two resolvers are provided:
//! - [`SubgraphBlockResolver`] asks an Ethereum blocks subgraph for the first block
//!   mined after the target timestamp.
//! - [`EstimatedBlockResolver`] extrapolates from a known anchor block and an average
//!   block time, for offline use and for chains without a blocks subgraph.
//!
//! Both capture "now" when constructed, so repeated lookups during one refresh agree.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::{FeeError, Result};
use crate::models::{BlockHeight, BlockHeights};
use crate::sources::graph::{GraphRequest, GraphTransport};

const SECONDS_PER_DAY: i64 = 86_400;

/// Width of the search window after the target timestamp (10 minutes).
const BLOCK_SEARCH_WINDOW_SECS: i64 = 600;

#[async_trait]
pub trait BlockResolver: Send + Sync {
    async fn block_at(&self, days_ago: u32) -> Result<BlockHeight>;
}

/// Resolve the three comparison heights concurrently.
pub async fn resolve_heights(resolver: &dyn BlockResolver) -> Result<BlockHeights> {
    let [d0, d1, d7] = BlockHeights::DAYS_AGO;

    let (now, yesterday, week_ago) = tokio::try_join!(
        resolver.block_at(d0),
        resolver.block_at(d1),
        resolver.block_at(d7),
    )?;

    debug!(
        "Resolved block heights: now={}, yesterday={}, weekAgo={}",
        now, yesterday, week_ago
    );
    Ok(BlockHeights::new(now, yesterday, week_ago))
}

fn target_timestamp(now: DateTime<Utc>, days_ago: u32) -> i64 {
    now.timestamp() - i64::from(days_ago) * SECONDS_PER_DAY
}

// ============================================
// Subgraph resolver
// ============================================

const BLOCK_QUERY: &str = r#"query blockAt($from: BigInt!, $to: BigInt!) {
  blocks(first: 1, orderBy: timestamp, orderDirection: asc, where: {timestamp_gt: $from, timestamp_lt: $to}) {
    number
  }
}"#;

#[derive(Debug, Deserialize)]
struct BlocksData {
    blocks: Vec<BlockEntry>,
}

#[derive(Debug, Deserialize)]
struct BlockEntry {
    number: String,
}

/// Resolves block heights through an Ethereum blocks subgraph.
pub struct SubgraphBlockResolver<T> {
    transport: T,
    endpoint: Url,
    now: DateTime<Utc>,
}

impl<T: GraphTransport> SubgraphBlockResolver<T> {
    pub fn new(transport: T, endpoint: Url) -> Self {
        Self::at(transport, endpoint, Utc::now())
    }

    /// Resolver anchored at a fixed instant instead of the current time.
    pub fn at(transport: T, endpoint: Url, now: DateTime<Utc>) -> Self {
        Self {
            transport,
            endpoint,
            now,
        }
    }
}

#[async_trait]
impl<T: GraphTransport> BlockResolver for SubgraphBlockResolver<T> {
    async fn block_at(&self, days_ago: u32) -> Result<BlockHeight> {
        let from = target_timestamp(self.now, days_ago);
        // Keep "today" clear of the indexing head, which may lag the wall clock.
        let from = if days_ago == 0 { from - BLOCK_SEARCH_WINDOW_SECS } else { from };
        let to = from + BLOCK_SEARCH_WINDOW_SECS;

        let request = GraphRequest::new(
            BLOCK_QUERY,
            json!({ "from": from.to_string(), "to": to.to_string() }),
        )
        .with_operation_name("blockAt");

        let data = self.transport.post(&self.endpoint, &request).await?;
        let data: BlocksData = serde_json::from_value(data)
            .map_err(|e| FeeError::Schema(format!("blocks response: {e}")))?;

        let entry = data.blocks.first().ok_or_else(|| FeeError::BlockLookup {
            days_ago,
            reason: format!("no block between {from} and {to}"),
        })?;

        entry.number.parse::<BlockHeight>().map_err(|e| {
            FeeError::Schema(format!("block number {:?} is not an integer: {e}", entry.number))
        })
    }
}

// ============================================
// Estimating resolver
// ============================================

/// Linear block estimate from a known anchor.
#[derive(Debug, Clone)]
pub struct EstimatedBlockResolver {
    anchor_block: BlockHeight,
    anchor_time: DateTime<Utc>,
    block_time_secs: f64,
    now: DateTime<Utc>,
}

impl EstimatedBlockResolver {
    pub fn new(
        anchor_block: BlockHeight,
        anchor_time: DateTime<Utc>,
        block_time_secs: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            anchor_block,
            anchor_time,
            block_time_secs,
            now,
        }
    }

    pub fn estimate(&self, days_ago: u32) -> Result<BlockHeight> {
        if !(self.block_time_secs.is_finite() && self.block_time_secs > 0.0) {
            return Err(FeeError::BlockLookup {
                days_ago,
                reason: format!("invalid block time {}", self.block_time_secs),
            });
        }

        let target = self.now - Duration::days(i64::from(days_ago));
        let elapsed = (target - self.anchor_time).num_seconds() as f64;
        let estimate = self.anchor_block as f64 + (elapsed / self.block_time_secs).floor();

        if estimate < 0.0 {
            return Err(FeeError::BlockLookup {
                days_ago,
                reason: "target precedes genesis".to_string(),
            });
        }
        Ok(estimate as BlockHeight)
    }
}

#[async_trait]
impl BlockResolver for EstimatedBlockResolver {
    async fn block_at(&self, days_ago: u32) -> Result<BlockHeight> {
        self.estimate(days_ago)
    }
}
