use cardprice_market_data::{GradedPrice, SourceId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price proposed for an item by one source during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCandidate {
    pub market_item_id: String,
    pub source: SourceId,
    pub price: Decimal,
    pub currency: String,
    pub grades: Vec<GradedPrice>,
}

/// Accepted change, applied to the catalog as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub market_item_id: String,
    pub source: String,
    pub previous_price: Option<Decimal>,
    pub new_price: Decimal,
    /// Percent change from the previous price; `None` on first pricing.
    pub percent_change: Option<Decimal>,
    pub currency: String,
    pub grades: Vec<GradedPrice>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only record of an accepted price change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub id: String,
    pub market_item_id: String,
    pub price: Decimal,
    pub previous_price: Option<Decimal>,
    pub percent_change: Option<Decimal>,
    pub currency: String,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceDecision {
    Accept(PriceUpdate),
    Reject { reason: String },
}

/// Result of a compare-and-set price write.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceWrite {
    Applied(PriceHistoryEntry),
    /// The stored price no longer matched `previous_price`; nothing was
    /// written. Carries the stored price as found.
    Stale { current: Option<Decimal> },
}

/// Result of running a candidate through the validator.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Updated(PriceHistoryEntry),
    Rejected { reason: String },
}
