//! Catalog storage trait.

use async_trait::async_trait;

use super::model::{ItemFilter, MarketItem, RefreshFilter};
use crate::errors::Result;

/// Storage interface for catalog items.
///
/// Price fields are written only through
/// [`PricingRepositoryTrait::apply_price_update`](crate::pricing::PricingRepositoryTrait::apply_price_update).
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    fn get_item(&self, item_id: &str) -> Result<Option<MarketItem>>;

    /// Items for an ingestion trigger: optional category and id filters,
    /// ordered by id, at most `filter.limit`.
    fn list_items(&self, filter: &ItemFilter) -> Result<Vec<MarketItem>>;

    /// Items for a scheduler run, ordered as the filter specifies.
    ///
    /// "Stalest first" means ascending `price_updated_at` with never-updated
    /// items first; ties break on id.
    fn select_for_refresh(&self, filter: &RefreshFilter, limit: usize) -> Result<Vec<MarketItem>>;

    /// Store the canonical key if the item has none yet.
    ///
    /// Returns whether a key was written.
    async fn set_canonical_key(&self, item_id: &str, key: &str) -> Result<bool>;

    /// Insert or replace catalog rows (catalog seeding).
    async fn upsert_items(&self, items: Vec<MarketItem>) -> Result<usize>;
}
