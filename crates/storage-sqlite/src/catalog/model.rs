//! Database models for catalog items.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use cardprice_core::catalog::MarketItem;

use crate::utils::{format_timestamp, parse_decimal, parse_timestamp};

/// Database model for catalog items
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    Insertable,
    AsChangeset,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::market_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct MarketItemDB {
    pub id: String,
    pub name: String,
    pub category: String,
    pub set_code: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub card_code: Option<String>,
    pub variant: Option<String>,
    pub language: Option<String>,
    pub current_price: Option<String>,
    pub currency: String,
    pub canonical_key: Option<String>,
    pub price_source: Option<String>,
    pub price_updated_at: Option<String>,
    pub is_trending: bool,
    pub recent_view_count: i64,
    pub active_listing_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MarketItemDB> for MarketItem {
    fn from(db: MarketItemDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            category: db.category,
            set_code: db.set_code,
            set_name: db.set_name,
            card_number: db.card_number,
            card_code: db.card_code,
            variant: db.variant,
            language: db.language,
            current_price: db.current_price.as_deref().map(parse_decimal),
            currency: db.currency,
            canonical_key: db.canonical_key,
            price_source: db.price_source,
            price_updated_at: db.price_updated_at.as_deref().map(parse_timestamp),
            is_trending: db.is_trending,
            recent_view_count: db.recent_view_count,
            active_listing_count: db.active_listing_count,
            created_at: parse_timestamp(&db.created_at),
            updated_at: parse_timestamp(&db.updated_at),
        }
    }
}

impl From<MarketItem> for MarketItemDB {
    fn from(domain: MarketItem) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            category: domain.category,
            set_code: domain.set_code,
            set_name: domain.set_name,
            card_number: domain.card_number,
            card_code: domain.card_code,
            variant: domain.variant,
            language: domain.language,
            current_price: domain.current_price.map(|p| p.to_string()),
            currency: domain.currency,
            canonical_key: domain.canonical_key,
            price_source: domain.price_source,
            price_updated_at: domain.price_updated_at.map(format_timestamp),
            is_trending: domain.is_trending,
            recent_view_count: domain.recent_view_count,
            active_listing_count: domain.active_listing_count,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }
}
