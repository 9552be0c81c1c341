use cardprice_market_data::{Game, Grade, ItemLookup};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::canonical_key::{canonical_key, KeyFields};

/// Catalog entity priced by the engine.
///
/// Demand signals (`is_trending`, `recent_view_count`, `active_listing_count`)
/// are maintained by other services and only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub set_code: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub card_code: Option<String>,
    pub variant: Option<String>,
    pub language: Option<String>,
    pub current_price: Option<Decimal>,
    pub currency: String,
    pub canonical_key: Option<String>,
    pub price_source: Option<String>,
    pub price_updated_at: Option<DateTime<Utc>>,
    pub is_trending: bool,
    pub recent_view_count: i64,
    pub active_listing_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketItem {
    /// New unpriced item with no demand signals.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            set_code: None,
            set_name: None,
            card_number: None,
            card_code: None,
            variant: None,
            language: None,
            current_price: None,
            currency: "USD".to_string(),
            canonical_key: None,
            price_source: None,
            price_updated_at: None,
            is_trending: false,
            recent_view_count: 0,
            active_listing_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn game(&self) -> Game {
        Game::from_category(&self.category)
    }

    pub fn key_fields(&self) -> KeyFields<'_> {
        KeyFields {
            category: &self.category,
            set_code: self.set_code.as_deref(),
            card_number: self.card_number.as_deref(),
            card_code: self.card_code.as_deref(),
            variant: self.variant.as_deref(),
            language: self.language.as_deref(),
        }
    }

    /// Key derived from the current identifying fields.
    pub fn derive_canonical_key(&self) -> Option<String> {
        canonical_key(&self.key_fields())
    }

    /// Identity handed to price sources.
    pub fn lookup(&self) -> ItemLookup {
        ItemLookup {
            item_id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            game: Some(self.game()),
            set_code: self.set_code.clone(),
            set_name: self.set_name.clone(),
            card_number: self.card_number.clone(),
            card_code: self.card_code.clone(),
            variant: self.variant.clone(),
            language: self.language.clone(),
        }
    }
}

/// Latest price for one condition grade of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketItemGrade {
    pub market_item_id: String,
    pub grade: Grade,
    pub price: Decimal,
    pub currency: String,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

/// Which items a refresh pass considers, and in what order.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshFilter {
    /// Priced items (current price > 0), stalest first.
    Priced,
    /// Trending items or items with at least `min_views` recent views, stalest first.
    InDemand { min_views: i64 },
    /// Items with at least one active listing, stalest first.
    ActivelyListed,
    /// Items never refreshed or refreshed before `cutoff`, stalest first.
    StaleSince { cutoff: DateTime<Utc> },
    /// Every item, ordered by category then id.
    All,
}

/// Item selection for an ingestion trigger.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub ids: Option<Vec<String>>,
    pub limit: usize,
}
