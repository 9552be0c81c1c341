use async_trait::async_trait;

use super::model::{PriceHistoryEntry, PriceUpdate, PriceWrite};
use crate::catalog::MarketItemGrade;
use crate::errors::Result;

/// Storage interface for verified prices.
#[async_trait]
pub trait PricingRepositoryTrait: Send + Sync {
    /// Apply an accepted update in a single transaction: write the item's
    /// price, source and timestamp, append a history row and upsert one
    /// grade row per graded price.
    ///
    /// The write only happens while the stored price, with non-positive
    /// values read as unpriced, still equals `update.previous_price`.
    /// Otherwise returns [`PriceWrite::Stale`] and writes nothing. A missing
    /// item is a `DatabaseError::NotFound`.
    async fn apply_price_update(&self, update: &PriceUpdate) -> Result<PriceWrite>;

    /// History rows for an item, oldest first.
    fn history_for_item(&self, market_item_id: &str) -> Result<Vec<PriceHistoryEntry>>;

    fn grades_for_item(&self, market_item_id: &str) -> Result<Vec<MarketItemGrade>>;
}
