use async_trait::async_trait;

use super::model::MatchReviewEntry;
use crate::errors::Result;

#[async_trait]
pub trait ReviewRepositoryTrait: Send + Sync {
    /// Insert the entry unless one already exists for its price event.
    ///
    /// Returns whether a row was inserted.
    async fn insert_if_absent(&self, entry: MatchReviewEntry) -> Result<bool>;

    /// Pending entries, oldest first.
    fn list_pending(&self, limit: usize) -> Result<Vec<MatchReviewEntry>>;
}
