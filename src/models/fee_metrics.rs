use serde::{Deserialize, Serialize};

/// Protocol category as shown to reporting consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    L1,
    L2,
    Dex,
    Lending,
    Xchain,
    Other,
}

/// Static identity of a tracked protocol.
///
/// Declared once per adapter as a `const` and copied into every [`FeeMetrics`]
/// the adapter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub fee_description: &'static str,
    pub blockchain: &'static str,
    pub source: &'static str,
    pub adapter: &'static str,
}

/// Fee summary for one protocol, one invocation.
///
/// Serialized with the field names reporting consumers expect
/// (`feeDescription`, `oneDay`, `sevenDayMA`). Never cached; each refresh
/// produces a new instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeMetrics {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub fee_description: String,
    pub blockchain: String,
    pub source: String,
    pub adapter: String,
    pub one_day: f64,
    #[serde(rename = "sevenDayMA")]
    pub seven_day_ma: f64,
}

impl FeeMetrics {
    pub fn new(meta: &ProtocolMeta, one_day: f64, seven_day_ma: f64) -> Self {
        Self {
            id: meta.id.to_string(),
            name: meta.name.to_string(),
            category: meta.category,
            description: meta.description.to_string(),
            fee_description: meta.fee_description.to_string(),
            blockchain: meta.blockchain.to_string(),
            source: meta.source.to_string(),
            adapter: meta.adapter.to_string(),
            one_day,
            seven_day_ma,
        }
    }
}
