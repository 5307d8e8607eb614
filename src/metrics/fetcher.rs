//! Snapshot Fetcher: one batched query for the same entity set at three heights.

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::error::{FeeError, Result};
use crate::models::{BlockHeights, SnapshotSet};
use crate::sources::graph::{GraphRequest, GraphTransport};

const OPERATION_NAME: &str = "snapshots";

/// Which entities to read and which of their fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotQuery {
    /// Top-level collection, e.g. `fixedProductMarketMakers`.
    pub collection: &'static str,
    /// GraphQL selection set, without the surrounding braces.
    pub selection: &'static str,
    /// Page size; `None` leaves the subgraph default in place.
    pub first: Option<u32>,
}

impl SnapshotQuery {
    /// Render the aliased `now` / `yesterday` / `weekAgo` query.
    pub fn render(&self) -> String {
        let page = self
            .first
            .map(|first| format!(", first: {first}"))
            .unwrap_or_default();

        let alias = |name: &str, var: &str| {
            format!(
                "  {name}: {collection}(block: {{number: ${var}}}{page}) {{\n    {selection}\n  }}\n",
                collection = self.collection,
                selection = self.selection,
            )
        };

        let mut query = format!(
            "query {OPERATION_NAME}($now: Int!, $yesterday: Int!, $weekAgo: Int!) {{\n"
        );
        query.push_str(&alias("now", "now"));
        query.push_str(&alias("yesterday", "yesterday"));
        query.push_str(&alias("weekAgo", "weekAgo"));
        query.push('}');
        query
    }

    pub fn request(&self, heights: &BlockHeights) -> GraphRequest {
        GraphRequest::new(
            self.render(),
            json!({
                "now": heights.now,
                "yesterday": heights.yesterday,
                "weekAgo": heights.week_ago,
            }),
        )
        .with_operation_name(OPERATION_NAME)
    }
}

/// Issue the batched query and decode the three lists into `T`.
///
/// Envelope problems surface from the transport as [`FeeError::Transport`]; a
/// well-formed `data` member that does not match `T` is a [`FeeError::Schema`].
pub async fn fetch_snapshots<T: DeserializeOwned>(
    transport: &dyn GraphTransport,
    endpoint: &Url,
    query: &SnapshotQuery,
    heights: &BlockHeights,
) -> Result<SnapshotSet<T>> {
    let data = transport.post(endpoint, &query.request(heights)).await?;

    let snapshots: SnapshotSet<T> = serde_json::from_value(data).map_err(|e| {
        FeeError::Schema(format!("{} response from {}: {}", query.collection, endpoint, e))
    })?;

    debug!(
        "Fetched {} {} records from {}: now={}, yesterday={}, weekAgo={}",
        snapshots.len(),
        query.collection,
        endpoint,
        snapshots.now.len(),
        snapshots.yesterday.len(),
        snapshots.week_ago.len()
    );
    Ok(snapshots)
}
