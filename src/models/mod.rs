mod entity;
mod fee_metrics;
mod snapshot;

pub use entity::{Denomination, EntityRecord, JoinedEntity};
pub use fee_metrics::{Category, FeeMetrics, ProtocolMeta};
pub use snapshot::{BlockHeight, BlockHeights, SnapshotSet};
