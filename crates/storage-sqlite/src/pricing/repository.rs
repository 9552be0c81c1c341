use std::sync::Arc;

use async_trait::async_trait;
use cardprice_core::catalog::MarketItemGrade;
use cardprice_core::errors::DatabaseError;
use cardprice_core::pricing::{PriceHistoryEntry, PriceUpdate, PriceWrite, PricingRepositoryTrait};
use cardprice_core::Result;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::model::{MarketItemGradeDB, PriceHistoryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{market_item_grades, market_items, price_history};
use crate::utils::{format_timestamp, parse_decimal};

pub struct PricingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PricingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PricingRepository { pool, writer }
    }
}

#[async_trait]
impl PricingRepositoryTrait for PricingRepository {
    async fn apply_price_update(&self, update: &PriceUpdate) -> Result<PriceWrite> {
        let update = update.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PriceWrite> {
                let stored = market_items::table
                    .find(&update.market_item_id)
                    .select(market_items::current_price)
                    .first::<Option<String>>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| {
                        DatabaseError::NotFound(format!("market item {}", update.market_item_id))
                    })?;
                let current = stored.as_deref().map(parse_decimal);
                if current.filter(|p| *p > Decimal::ZERO) != update.previous_price {
                    debug!(
                        "Price for {} is {:?}, expected {:?}; not applied",
                        update.market_item_id, current, update.previous_price
                    );
                    return Ok(PriceWrite::Stale { current });
                }

                let updated_at = format_timestamp(update.updated_at);

                diesel::update(market_items::table.find(&update.market_item_id))
                    .set((
                        market_items::current_price.eq(update.new_price.to_string()),
                        market_items::currency.eq(&update.currency),
                        market_items::price_source.eq(&update.source),
                        market_items::price_updated_at.eq(&updated_at),
                        market_items::updated_at.eq(&updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let entry = PriceHistoryEntry {
                    id: Uuid::new_v4().to_string(),
                    market_item_id: update.market_item_id.clone(),
                    price: update.new_price,
                    previous_price: update.previous_price,
                    percent_change: update.percent_change,
                    currency: update.currency.clone(),
                    source: update.source.clone(),
                    recorded_at: update.updated_at,
                };
                diesel::insert_into(price_history::table)
                    .values(PriceHistoryDB::from(&entry))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                for graded in &update.grades {
                    let row = MarketItemGradeDB {
                        market_item_id: update.market_item_id.clone(),
                        grade: graded.grade.as_str().to_string(),
                        price: graded.price.to_string(),
                        currency: update.currency.clone(),
                        source: update.source.clone(),
                        updated_at: updated_at.clone(),
                    };
                    diesel::insert_into(market_item_grades::table)
                        .values(&row)
                        .on_conflict((market_item_grades::market_item_id, market_item_grades::grade))
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                Ok(PriceWrite::Applied(entry))
            })
            .await
    }

    fn history_for_item(&self, market_item_id: &str) -> Result<Vec<PriceHistoryEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = price_history::table
            .filter(price_history::market_item_id.eq(market_item_id))
            .order((price_history::recorded_at.asc(), price_history::id.asc()))
            .select(PriceHistoryDB::as_select())
            .load::<PriceHistoryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PriceHistoryEntry::from).collect())
    }

    fn grades_for_item(&self, market_item_id: &str) -> Result<Vec<MarketItemGrade>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = market_item_grades::table
            .filter(market_item_grades::market_item_id.eq(market_item_id))
            .order(market_item_grades::grade.asc())
            .select(MarketItemGradeDB::as_select())
            .load::<MarketItemGradeDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match MarketItemGrade::try_from(row) {
                Ok(grade) => Some(grade),
                Err(unknown) => {
                    warn!("Skipping unknown grade '{}' for {}", unknown, market_item_id);
                    None
                }
            })
            .collect())
    }
}
