//! Database models for price events.

use diesel::prelude::*;

use cardprice_core::price_events::PriceEvent;
use cardprice_market_data::EventType;

use crate::utils::{format_timestamp, parse_decimal, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::price_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceEventDB {
    pub id: String,
    pub source: String,
    pub source_event_id: String,
    pub payload: String,
    pub title: String,
    pub price: String,
    pub currency: String,
    pub event_type: String,
    pub observed_at: Option<String>,
    pub market_item_id: Option<String>,
    pub match_confidence: f64,
    pub is_outlier: bool,
    pub outlier_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Columns rewritten when an event is ingested again. `id` and
/// `created_at` are left untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::price_events)]
#[diesel(treat_none_as_null = true)]
pub struct PriceEventChangeset<'a> {
    pub payload: &'a str,
    pub title: &'a str,
    pub price: &'a str,
    pub currency: &'a str,
    pub event_type: &'a str,
    pub observed_at: Option<&'a str>,
    pub market_item_id: Option<&'a str>,
    pub match_confidence: f64,
    pub is_outlier: bool,
    pub outlier_reason: Option<&'a str>,
    pub updated_at: &'a str,
}

impl<'a> From<&'a PriceEventDB> for PriceEventChangeset<'a> {
    fn from(row: &'a PriceEventDB) -> Self {
        Self {
            payload: &row.payload,
            title: &row.title,
            price: &row.price,
            currency: &row.currency,
            event_type: &row.event_type,
            observed_at: row.observed_at.as_deref(),
            market_item_id: row.market_item_id.as_deref(),
            match_confidence: row.match_confidence,
            is_outlier: row.is_outlier,
            outlier_reason: row.outlier_reason.as_deref(),
            updated_at: &row.updated_at,
        }
    }
}

impl From<PriceEventDB> for PriceEvent {
    fn from(db: PriceEventDB) -> Self {
        Self {
            id: db.id,
            source: db.source,
            source_event_id: db.source_event_id,
            payload: serde_json::from_str(&db.payload).unwrap_or(serde_json::Value::Null),
            title: db.title,
            price: parse_decimal(&db.price),
            currency: db.currency,
            event_type: EventType::parse(&db.event_type).unwrap_or(EventType::Sale),
            observed_at: db.observed_at.as_deref().map(parse_timestamp),
            market_item_id: db.market_item_id,
            match_confidence: db.match_confidence,
            is_outlier: db.is_outlier,
            outlier_reason: db.outlier_reason,
            created_at: parse_timestamp(&db.created_at),
            updated_at: parse_timestamp(&db.updated_at),
        }
    }
}

impl From<PriceEvent> for PriceEventDB {
    fn from(domain: PriceEvent) -> Self {
        Self {
            id: domain.id,
            source: domain.source,
            source_event_id: domain.source_event_id,
            payload: domain.payload.to_string(),
            title: domain.title,
            price: domain.price.to_string(),
            currency: domain.currency,
            event_type: domain.event_type.as_str().to_string(),
            observed_at: domain.observed_at.map(format_timestamp),
            market_item_id: domain.market_item_id,
            match_confidence: domain.match_confidence,
            is_outlier: domain.is_outlier,
            outlier_reason: domain.outlier_reason,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }
}
