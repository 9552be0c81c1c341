//! Database models for price history and graded prices.

use diesel::prelude::*;

use cardprice_core::catalog::MarketItemGrade;
use cardprice_core::pricing::PriceHistoryEntry;
use cardprice_market_data::Grade;

use crate::utils::{format_timestamp, parse_decimal, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::price_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceHistoryDB {
    pub id: String,
    pub market_item_id: String,
    pub price: String,
    pub previous_price: Option<String>,
    pub percent_change: Option<String>,
    pub currency: String,
    pub source: String,
    pub recorded_at: String,
}

impl From<PriceHistoryDB> for PriceHistoryEntry {
    fn from(db: PriceHistoryDB) -> Self {
        Self {
            id: db.id,
            market_item_id: db.market_item_id,
            price: parse_decimal(&db.price),
            previous_price: db.previous_price.as_deref().map(parse_decimal),
            percent_change: db.percent_change.as_deref().map(parse_decimal),
            currency: db.currency,
            source: db.source,
            recorded_at: parse_timestamp(&db.recorded_at),
        }
    }
}

impl From<&PriceHistoryEntry> for PriceHistoryDB {
    fn from(entry: &PriceHistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            market_item_id: entry.market_item_id.clone(),
            price: entry.price.to_string(),
            previous_price: entry.previous_price.map(|p| p.to_string()),
            percent_change: entry.percent_change.map(|p| p.to_string()),
            currency: entry.currency.clone(),
            source: entry.source.clone(),
            recorded_at: format_timestamp(entry.recorded_at),
        }
    }
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::market_item_grades)]
#[diesel(primary_key(market_item_id, grade))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketItemGradeDB {
    pub market_item_id: String,
    pub grade: String,
    pub price: String,
    pub currency: String,
    pub source: String,
    pub updated_at: String,
}

/// Rows with a grade this build does not know are skipped by the caller.
impl TryFrom<MarketItemGradeDB> for MarketItemGrade {
    type Error = String;

    fn try_from(db: MarketItemGradeDB) -> Result<Self, Self::Error> {
        let grade = Grade::parse(&db.grade).ok_or(db.grade)?;
        Ok(Self {
            market_item_id: db.market_item_id,
            grade,
            price: parse_decimal(&db.price),
            currency: db.currency,
            source: db.source,
            updated_at: parse_timestamp(&db.updated_at),
        })
    }
}
