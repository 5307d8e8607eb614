//! Metric Reducer: fold joined entities into `oneDay` and `sevenDayMA`.

use crate::error::{FeeError, Result};
use crate::metrics::joiner::EntityMap;
use crate::metrics::normalizer::{PriceTable, Window};
use crate::models::{Denomination, JoinedEntity};

/// Days in the moving-average window.
pub const MOVING_AVERAGE_DAYS: f64 = 7.0;

/// Reduced fee totals for one protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeTotals {
    pub one_day: f64,
    /// Fee revenue accumulated between the week-old snapshot and now.
    pub seven_day_sum: f64,
    pub seven_day_ma: f64,
    /// Entities that contributed to `one_day` / `seven_day_sum`.
    pub one_day_entities: usize,
    pub seven_day_entities: usize,
}

fn term(
    entity: &JoinedEntity,
    denomination: &Denomination,
    now: f64,
    past: Option<f64>,
    prices: &PriceTable,
    window: Window,
) -> Result<Option<f64>> {
    let Some(past) = past else {
        return Ok(None);
    };
    let delta_usd = prices.to_usd(now - past, denomination, window)?;
    Ok(Some(entity.rate_or_one() * delta_usd))
}

/// Sum fee deltas across entities.
///
/// - `oneDay` sums `rate_or_1 * usd(now - yesterday)` over entities with both points.
/// - `sevenDayMA` sums `rate_or_1 * usd(now - weekAgo)` over entities with both
///   points, divided by 7.
///
/// Entities without a `now` observation are excluded from both sums. A missing
/// comparison point only removes the entity from that one sum. An entity with no
/// denomination is a [`FeeError::Schema`].
pub fn reduce(entities: &EntityMap, prices: &PriceTable) -> Result<FeeTotals> {
    let mut totals = FeeTotals::default();

    for (id, entity) in entities {
        let Some(now) = entity.now else {
            continue;
        };
        let denomination = entity
            .denomination
            .as_ref()
            .ok_or_else(|| FeeError::Schema(format!("entity {} has no denomination", id)))?;

        if let Some(fees) = term(
            entity,
            denomination,
            now,
            entity.yesterday,
            prices,
            Window::OneDay,
        )? {
            totals.one_day += fees;
            totals.one_day_entities += 1;
        }
        if let Some(fees) = term(
            entity,
            denomination,
            now,
            entity.week_ago,
            prices,
            Window::SevenDay,
        )? {
            totals.seven_day_sum += fees;
            totals.seven_day_entities += 1;
        }
    }

    totals.seven_day_ma = totals.seven_day_sum / MOVING_AVERAGE_DAYS;
    Ok(totals)
}
