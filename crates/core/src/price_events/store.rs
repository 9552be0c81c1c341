use async_trait::async_trait;

use super::model::PriceEvent;
use crate::errors::Result;

/// Storage interface for price events.
#[async_trait]
pub trait PriceEventRepositoryTrait: Send + Sync {
    /// Insert, or update the row with the same (source, source_event_id).
    ///
    /// An existing row keeps its `id` and `created_at`; every other field is
    /// overwritten. Returns the stored row.
    async fn upsert_event(&self, event: PriceEvent) -> Result<PriceEvent>;

    fn get_by_source_event(&self, source: &str, source_event_id: &str)
        -> Result<Option<PriceEvent>>;

    /// Events matched to an item, newest first.
    fn list_for_item(&self, market_item_id: &str) -> Result<Vec<PriceEvent>>;
}
