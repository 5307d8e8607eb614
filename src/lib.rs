pub mod adapters;
pub mod config;
pub mod cron;
pub mod error;
pub mod metrics;
pub mod models;
pub mod service;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod testing;

pub use adapters::{AdapterContext, AdapterRegistry, FeeAdapter};
pub use config::Settings;
pub use cron::CronScheduler;
pub use error::FeeError;
pub use models::FeeMetrics;
pub use service::FeeService;
