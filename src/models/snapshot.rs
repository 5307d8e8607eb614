use serde::Deserialize;

/// Block height on an append-only ledger.
pub type BlockHeight = u64;

/// The three block heights every adapter compares.
///
/// Resolved once per refresh and handed to adapters explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeights {
    pub now: BlockHeight,
    pub yesterday: BlockHeight,
    pub week_ago: BlockHeight,
}

impl BlockHeights {
    /// Lookback of each snapshot, in days, in fetch order.
    pub const DAYS_AGO: [u32; 3] = [0, 1, 7];

    pub fn new(now: BlockHeight, yesterday: BlockHeight, week_ago: BlockHeight) -> Self {
        Self {
            now,
            yesterday,
            week_ago,
        }
    }
}

/// One protocol's entity list at the three block heights.
///
/// Field names match the aliases of the batched snapshot query.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SnapshotSet<T> {
    pub now: Vec<T>,
    pub yesterday: Vec<T>,
    #[serde(rename = "weekAgo")]
    pub week_ago: Vec<T>,
}

impl<T> SnapshotSet<T> {
    pub fn new(now: Vec<T>, yesterday: Vec<T>, week_ago: Vec<T>) -> Self {
        Self {
            now,
            yesterday,
            week_ago,
        }
    }

    /// Apply a fallible conversion to every record, keeping the three lists apart.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<SnapshotSet<U>, E> {
        Ok(SnapshotSet {
            now: self.now.into_iter().map(&mut f).collect::<Result<_, _>>()?,
            yesterday: self.yesterday.into_iter().map(&mut f).collect::<Result<_, _>>()?,
            week_ago: self.week_ago.into_iter().map(&mut f).collect::<Result<_, _>>()?,
        })
    }

    pub fn len(&self) -> usize {
        self.now.len() + self.yesterday.len() + self.week_ago.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
