//! Historical average price oracle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::{FeeError, Result};
use crate::utils::validate_usd_price;

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Mean USD price of `asset` over the trailing `days_ago` days.
    async fn avg_price(&self, asset: &str, days_ago: u32) -> Result<f64>;
}

#[async_trait]
impl<T: PriceOracle + ?Sized> PriceOracle for Arc<T> {
    async fn avg_price(&self, asset: &str, days_ago: u32) -> Result<f64> {
        (**self).avg_price(asset, days_ago).await
    }
}

/// `market_chart` payload: `prices` is a list of `[timestamp_ms, price]` pairs.
#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

/// Average a `[timestamp, price]` series, rejecting empty or non-finite input.
pub fn average_price(series: &[(f64, f64)]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let sum: f64 = series.iter().map(|(_, price)| price).sum();
    let avg = sum / series.len() as f64;
    avg.is_finite().then_some(avg)
}

/// CoinGecko `market_chart` client.
///
/// Answers are kept in a small TTL cache keyed by `(asset, days_ago)`: within one
/// refresh several adapters may price the same asset, and the upstream API is
/// aggressively rate limited.
pub struct CoinGeckoOracle {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<(String, u32), f64>,
}

impl CoinGeckoOracle {
    pub fn new(client: reqwest::Client, base_url: Url, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            client,
            base_url,
            cache,
        }
    }

    fn chart_url(&self, asset: &str, days_ago: u32) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FeeError::price_lookup(asset, days_ago, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(["coins", asset, "market_chart"]);
        url.query_pairs_mut()
            .append_pair("vs_currency", "usd")
            .append_pair("days", &days_ago.to_string());
        Ok(url)
    }

    async fn fetch(&self, asset: &str, days_ago: u32) -> Result<f64> {
        let url = self.chart_url(asset, days_ago)?;
        debug!("Fetching {}d average price for {} from {}", days_ago, asset, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeeError::price_unavailable(asset, days_ago, e))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeeError::price_unavailable(
                asset,
                days_ago,
                format!("status {status}"),
            ));
        }
        if !status.is_success() {
            return Err(FeeError::price_lookup(
                asset,
                days_ago,
                format!("status {status}"),
            ));
        }

        let chart: MarketChart = response
            .json()
            .await
            .map_err(|e| FeeError::price_lookup(asset, days_ago, e))?;

        average_price(&chart.prices)
            .and_then(validate_usd_price)
            .ok_or_else(|| {
                FeeError::price_lookup(
                    asset,
                    days_ago,
                    format!("no usable price in {} samples", chart.prices.len()),
                )
            })
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn avg_price(&self, asset: &str, days_ago: u32) -> Result<f64> {
        let key = (asset.to_string(), days_ago);
        if let Some(price) = self.cache.get(&key).await {
            return Ok(price);
        }

        let price = self.fetch(asset, days_ago).await?;
        self.cache.insert(key, price).await;
        Ok(price)
    }
}
