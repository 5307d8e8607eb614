//! Price Normalizer: convert raw amounts to USD with lookback-matched prices.
//!
//! A one-day comparison is priced with the one-day average, a seven-day comparison
//! with the seven-day average.

use futures::future::try_join_all;
use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{FeeError, Result};
use crate::models::Denomination;
use crate::sources::prices::PriceOracle;
use crate::utils::validate_usd_price;

/// Comparison window a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    OneDay,
    SevenDay,
}

impl Window {
    pub const fn days(self) -> u32 {
        match self {
            Window::OneDay => 1,
            Window::SevenDay => 7,
        }
    }
}

/// Average prices of one asset for both windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPrices {
    pub one_day: f64,
    pub seven_day: f64,
}

impl WindowPrices {
    pub fn get(&self, window: Window) -> f64 {
        match window {
            Window::OneDay => self.one_day,
            Window::SevenDay => self.seven_day,
        }
    }
}

/// Prices for every non-USD asset an adapter needs, fetched before reduction.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: FxHashMap<String, WindowPrices>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, asset: impl Into<String>, prices: WindowPrices) -> Self {
        self.prices.insert(asset.into(), prices);
        self
    }

    /// Fetch both windows for every asset concurrently.
    pub async fn fetch(oracle: &dyn PriceOracle, assets: &[&str]) -> Result<Self> {
        let lookups = assets.iter().map(|&asset| async move {
            let (one_day, seven_day) = tokio::try_join!(
                fetch_one(oracle, asset, Window::OneDay),
                fetch_one(oracle, asset, Window::SevenDay),
            )?;
            Ok::<_, FeeError>((asset.to_string(), WindowPrices { one_day, seven_day }))
        });

        let prices = try_join_all(lookups).await?.into_iter().collect();
        Ok(Self { prices })
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// USD value of `amount` for the given window.
    pub fn to_usd(&self, amount: f64, denomination: &Denomination, window: Window) -> Result<f64> {
        match denomination {
            Denomination::Usd => Ok(amount),
            Denomination::Asset(asset) => {
                let prices = self.prices.get(asset).ok_or_else(|| {
                    FeeError::price_lookup(asset, window.days(), "asset was not prefetched")
                })?;
                Ok(amount * prices.get(window))
            }
        }
    }
}

async fn fetch_one(oracle: &dyn PriceOracle, asset: &str, window: Window) -> Result<f64> {
    let days = window.days();
    let price = oracle.avg_price(asset, days).await?;
    let price = validate_usd_price(price).ok_or_else(|| {
        FeeError::price_lookup(asset, days, format!("implausible price {price}"))
    })?;
    debug!("{}d average price for {}: {}", days, asset, price);
    Ok(price)
}
