use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::adapters::{mstable, omen};

/// Outbound HTTP settings shared by the subgraph client and the price oracle.
///
/// The timeout is the only one in the pipeline; adapters add none of their own.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// How block heights for "now", "yesterday" and "a week ago" are resolved.
///
/// - `subgraph`: query an Ethereum blocks subgraph (accurate, needs network)
/// - `estimate`: extrapolate from an anchor block at a fixed block time
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum BlockSettings {
    Subgraph {
        #[serde(default = "default_blocks_url")]
        url: String,
    },
    Estimate {
        anchor_block: u64,
        /// Unix timestamp (seconds) of `anchor_block`.
        anchor_timestamp: i64,
        #[serde(default = "default_block_time_secs")]
        block_time_secs: f64,
    },
}

impl Default for BlockSettings {
    fn default() -> Self {
        BlockSettings::Subgraph {
            url: default_blocks_url(),
        }
    }
}

fn default_blocks_url() -> String {
    "https://api.thegraph.com/subgraphs/name/blocklytics/ethereum-blocks".to_string()
}

fn default_block_time_secs() -> f64 {
    12.0
}

/// Historical price oracle (CoinGecko-compatible `market_chart` API).
#[derive(Debug, Deserialize, Clone)]
pub struct PriceSettings {
    #[serde(default = "default_prices_url")]
    pub base_url: String,
    /// Lifetime of cached average prices. Keep it well below a day.
    #[serde(default = "default_price_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            base_url: default_prices_url(),
            cache_ttl_secs: default_price_cache_ttl(),
        }
    }
}

fn default_prices_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_price_cache_ttl() -> u64 {
    600
}

/// One protocol adapter.
#[derive(Debug, Deserialize, Clone)]
pub struct AdapterSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub endpoint: String,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdaptersSettings {
    #[serde(default = "default_mstable")]
    pub mstable: AdapterSettings,
    #[serde(default = "default_omen")]
    pub omen: AdapterSettings,
}

impl Default for AdaptersSettings {
    fn default() -> Self {
        Self {
            mstable: default_mstable(),
            omen: default_omen(),
        }
    }
}

fn default_mstable() -> AdapterSettings {
    AdapterSettings {
        enabled: true,
        endpoint: mstable::DEFAULT_ENDPOINT.to_string(),
    }
}

fn default_omen() -> AdapterSettings {
    AdapterSettings {
        enabled: true,
        endpoint: omen::DEFAULT_ENDPOINT.to_string(),
    }
}

/// Periodic refresh for `feewatch watch`.
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerSettings {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Where the latest metrics are written as a JSON array.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            output_path: default_output_path(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    3600 // 1 hour
}

fn default_output_path() -> String {
    "fees.json".to_string()
}

/// Root application configuration.
///
/// Loaded from an optional `config.yaml`, then overridden by `FEEWATCH__*`
/// environment variables (e.g. `FEEWATCH__HTTP__TIMEOUT_SECS=10`).
/// Every section has defaults, so no file is required.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub blocks: BlockSettings,
    #[serde(default)]
    pub prices: PriceSettings,
    #[serde(default)]
    pub adapters: AdaptersSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_path("config")
    }

    /// Load from `path` (extension optional, file optional) plus the environment.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("FEEWATCH").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::from_path("/nonexistent/feewatch-config").unwrap();

        assert_eq!(settings.http.timeout_secs, 30);
        assert_eq!(settings.blocks, BlockSettings::default());
        assert!(settings.adapters.omen.enabled);
        assert_eq!(settings.adapters.omen.endpoint, omen::DEFAULT_ENDPOINT);
        assert_eq!(settings.scheduler.output_path, "fees.json");
    }

    #[test]
    fn test_new_without_config_file_uses_defaults() {
        // the crate root ships only config.example.yaml
        let settings = Settings::new().unwrap();
        assert_eq!(settings.prices.cache_ttl_secs, 600);
        assert_eq!(settings.scheduler.refresh_interval_secs, 3600);
    }

    #[test]
    fn test_yaml_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
blocks:
  source: estimate
  anchor_block: 19000000
  anchor_timestamp: 1705000000
adapters:
  mstable:
    enabled: false
    endpoint: http://localhost:8000/subgraphs/name/mstable
scheduler:
  refresh_interval_secs: 60
"#
        )
        .unwrap();

        let settings = Settings::from_path(file.path().to_str().unwrap()).unwrap();

        assert_eq!(
            settings.blocks,
            BlockSettings::Estimate {
                anchor_block: 19_000_000,
                anchor_timestamp: 1_705_000_000,
                block_time_secs: 12.0,
            }
        );
        assert!(!settings.adapters.mstable.enabled);
        assert!(settings.adapters.omen.enabled);
        assert_eq!(settings.scheduler.refresh_interval_secs, 60);
        assert_eq!(settings.scheduler.output_path, "fees.json");
    }
}
