use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use super::model::{MatchReviewEntry, ReviewStatus};
use super::store::ReviewRepositoryTrait;
use crate::errors::Result;
use crate::price_events::PriceEvent;

/// Human-readable reason stored with a review entry.
pub fn review_reason(confidence: f64) -> String {
    format!(
        "confidence {}% - needs manual verification",
        (confidence * 100.0).round() as i64
    )
}

/// Escalates ambiguous matches to manual review.
pub struct ReviewQueueManager {
    repository: Arc<dyn ReviewRepositoryTrait>,
}

impl ReviewQueueManager {
    pub fn new(repository: Arc<dyn ReviewRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Queue `event` as a proposed match for `item_id`.
    ///
    /// Idempotent per price event: returns `false` when the event is already
    /// queued.
    pub async fn enqueue(&self, event: &PriceEvent, item_id: &str, confidence: f64) -> Result<bool> {
        let entry = MatchReviewEntry {
            id: Uuid::new_v4().to_string(),
            source: event.source.clone(),
            source_event_id: event.source_event_id.clone(),
            price_event_id: event.id.clone(),
            payload: event.payload.clone(),
            proposed_item_id: item_id.to_string(),
            proposed_confidence: confidence,
            reason: review_reason(confidence),
            status: ReviewStatus::Pending,
            created_at: Utc::now(),
        };

        let inserted = self.repository.insert_if_absent(entry).await?;
        if inserted {
            info!(
                "Queued {}:{} for review against {} ({:.2})",
                event.source, event.source_event_id, item_id, confidence
            );
        } else {
            debug!(
                "{}:{} already queued for review",
                event.source, event.source_event_id
            );
        }
        Ok(inserted)
    }

    pub fn list_pending(&self, limit: usize) -> Result<Vec<MatchReviewEntry>> {
        self.repository.list_pending(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_event, InMemoryStore};

    #[test]
    fn test_review_reason() {
        assert_eq!(review_reason(0.8), "confidence 80% - needs manual verification");
        assert_eq!(review_reason(0.746), "confidence 75% - needs manual verification");
    }

    #[tokio::test]
    async fn test_enqueue_is_idempotent_per_event() {
        let store = InMemoryStore::new();
        let manager = ReviewQueueManager::new(Arc::new(store.clone()));
        let event = sample_event("ebay", "e1");

        assert!(manager.enqueue(&event, "item-1", 0.8).await.unwrap());
        assert!(!manager.enqueue(&event, "item-1", 0.8).await.unwrap());

        let pending = manager.list_pending(10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, ReviewStatus::Pending);
        assert_eq!(pending[0].proposed_item_id, "item-1");
        assert_eq!(pending[0].price_event_id, event.id);
    }
}
