//! Database model for the match review queue.

use diesel::prelude::*;

use cardprice_core::review::{MatchReviewEntry, ReviewStatus};

use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::match_review_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchReviewDB {
    pub id: String,
    pub source: String,
    pub source_event_id: String,
    pub price_event_id: String,
    pub payload: String,
    pub proposed_item_id: String,
    pub proposed_confidence: f64,
    pub reason: String,
    pub status: String,
    pub created_at: String,
}

impl From<MatchReviewDB> for MatchReviewEntry {
    fn from(db: MatchReviewDB) -> Self {
        Self {
            id: db.id,
            source: db.source,
            source_event_id: db.source_event_id,
            price_event_id: db.price_event_id,
            payload: serde_json::from_str(&db.payload).unwrap_or(serde_json::Value::Null),
            proposed_item_id: db.proposed_item_id,
            proposed_confidence: db.proposed_confidence,
            reason: db.reason,
            status: db.status.parse().unwrap_or(ReviewStatus::Pending),
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<MatchReviewEntry> for MatchReviewDB {
    fn from(domain: MatchReviewEntry) -> Self {
        Self {
            id: domain.id,
            source: domain.source,
            source_event_id: domain.source_event_id,
            price_event_id: domain.price_event_id,
            payload: domain.payload.to_string(),
            proposed_item_id: domain.proposed_item_id,
            proposed_confidence: domain.proposed_confidence,
            reason: domain.reason,
            status: domain.status.as_str().to_string(),
            created_at: format_timestamp(domain.created_at),
        }
    }
}
