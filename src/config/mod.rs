#[allow(clippy::module_inception)]
mod config;

pub use config::{
    AdapterSettings, AdaptersSettings, BlockSettings, HttpSettings, PriceSettings,
    SchedulerSettings, Settings,
};
