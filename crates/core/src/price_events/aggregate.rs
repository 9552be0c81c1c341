use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::model::PriceEvent;

/// Summary statistics over non-outlier events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAggregate {
    pub count: usize,
    pub min: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
    pub median: Decimal,
}

/// Two decimals, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Aggregate event prices, skipping outliers.
///
/// Returns `None` when no event qualifies. Mean and median are rounded to
/// two decimals.
pub fn aggregate_prices<'a, I>(events: I) -> Option<PriceAggregate>
where
    I: IntoIterator<Item = &'a PriceEvent>,
{
    let mut prices: Vec<Decimal> = events
        .into_iter()
        .filter(|e| !e.is_outlier)
        .map(|e| e.price)
        .collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort();

    let count = prices.len();
    let sum: Decimal = prices.iter().copied().sum();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / Decimal::from(2)
    } else {
        prices[mid]
    };

    Some(PriceAggregate {
        count,
        min: prices[0],
        max: prices[count - 1],
        mean: round_money(sum / Decimal::from(count as u64)),
        median: round_money(median),
    })
}
