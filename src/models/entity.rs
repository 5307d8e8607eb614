/// Unit a raw amount is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Denomination {
    /// Already USD; normalization is the identity.
    Usd,
    /// Priced through the oracle under this asset id (e.g. `bitcoin`).
    Asset(String),
}

/// One raw snapshot record after protocol-specific extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    /// Cumulative volume or cumulative fees, in `denomination` units.
    pub value: f64,
    /// Scaled fee rate, `None` when `value` already counts fees.
    pub rate: Option<f64>,
    pub denomination: Denomination,
}

impl EntityRecord {
    pub fn usd(id: impl Into<String>, value: f64, rate: Option<f64>) -> Self {
        Self {
            id: id.into(),
            value,
            rate,
            denomination: Denomination::Usd,
        }
    }
}

/// One entity's observations across the three snapshots.
///
/// Any field may be absent. Absent observations are never treated as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedEntity {
    pub now: Option<f64>,
    pub yesterday: Option<f64>,
    pub week_ago: Option<f64>,
    pub rate: Option<f64>,
    pub denomination: Option<Denomination>,
}

impl JoinedEntity {
    /// Shallow overlay: fields already set on `self` win, `other` only fills gaps.
    pub fn overlay(&mut self, other: JoinedEntity) {
        self.now = self.now.or(other.now);
        self.yesterday = self.yesterday.or(other.yesterday);
        self.week_ago = self.week_ago.or(other.week_ago);
        self.rate = self.rate.or(other.rate);
        if self.denomination.is_none() {
            self.denomination = other.denomination;
        }
    }

    /// `rate` when the protocol charges a rate on volume, 1 when values are fees already.
    #[inline]
    pub fn rate_or_one(&self) -> f64 {
        self.rate.unwrap_or(1.0)
    }
}
