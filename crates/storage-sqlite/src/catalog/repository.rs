use std::sync::Arc;

use async_trait::async_trait;
use cardprice_core::catalog::{CatalogRepositoryTrait, ItemFilter, MarketItem, RefreshFilter};
use cardprice_core::Result;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::SqliteConnection;

use super::model::MarketItemDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::market_items;
use crate::utils::{chunk_for_sqlite, format_timestamp};

pub struct CatalogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CatalogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CatalogRepository { pool, writer }
    }

    fn list_by_ids(&self, ids: &[String], filter: &ItemFilter) -> Result<Vec<MarketItem>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows = Vec::new();
        for chunk in chunk_for_sqlite(ids) {
            let mut query = market_items::table
                .filter(market_items::id.eq_any(chunk))
                .into_boxed();
            if let Some(category) = &filter.category {
                query = query.filter(market_items::category.eq(category));
            }
            rows.extend(
                query
                    .select(MarketItemDB::as_select())
                    .load::<MarketItemDB>(&mut conn)
                    .map_err(StorageError::from)?,
            );
        }
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows.truncate(filter.limit);
        Ok(rows.into_iter().map(MarketItem::from).collect())
    }
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    fn get_item(&self, item_id: &str) -> Result<Option<MarketItem>> {
        let mut conn = get_connection(&self.pool)?;
        let row = market_items::table
            .find(item_id)
            .select(MarketItemDB::as_select())
            .first::<MarketItemDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(MarketItem::from))
    }

    fn list_items(&self, filter: &ItemFilter) -> Result<Vec<MarketItem>> {
        if let Some(ids) = &filter.ids {
            return self.list_by_ids(ids, filter);
        }

        let mut conn = get_connection(&self.pool)?;
        let mut query = market_items::table.into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(market_items::category.eq(category));
        }
        let rows = query
            .order(market_items::id.asc())
            .limit(filter.limit as i64)
            .select(MarketItemDB::as_select())
            .load::<MarketItemDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(MarketItem::from).collect())
    }

    fn select_for_refresh(&self, filter: &RefreshFilter, limit: usize) -> Result<Vec<MarketItem>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = market_items::table.into_boxed();

        query = match filter {
            RefreshFilter::Priced => query
                .filter(market_items::current_price.is_not_null())
                .filter(sql::<Bool>("CAST(current_price AS REAL) > 0")),
            RefreshFilter::InDemand { min_views } => query.filter(
                market_items::is_trending
                    .eq(true)
                    .or(market_items::recent_view_count.ge(*min_views)),
            ),
            RefreshFilter::ActivelyListed => {
                query.filter(market_items::active_listing_count.gt(0))
            }
            RefreshFilter::StaleSince { cutoff } => query.filter(
                market_items::price_updated_at
                    .is_null()
                    .or(market_items::price_updated_at.lt(format_timestamp(*cutoff))),
            ),
            RefreshFilter::All => query,
        };

        // SQLite sorts NULL first in ascending order: never-refreshed items lead.
        query = match filter {
            RefreshFilter::All => {
                query.order((market_items::category.asc(), market_items::id.asc()))
            }
            _ => query.order((market_items::price_updated_at.asc(), market_items::id.asc())),
        };

        let rows = query
            .limit(limit as i64)
            .select(MarketItemDB::as_select())
            .load::<MarketItemDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(MarketItem::from).collect())
    }

    async fn set_canonical_key(&self, item_id: &str, key: &str) -> Result<bool> {
        let item_id = item_id.to_string();
        let key = key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let updated = diesel::update(
                    market_items::table
                        .filter(market_items::id.eq(&item_id))
                        .filter(market_items::canonical_key.is_null()),
                )
                .set(market_items::canonical_key.eq(&key))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(updated > 0)
            })
            .await
    }

    async fn upsert_items(&self, items: Vec<MarketItem>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for item in items {
                    let row: MarketItemDB = item.into();
                    affected_rows += diesel::insert_into(market_items::table)
                        .values(&row)
                        .on_conflict(market_items::id)
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected_rows)
            })
            .await
    }
}
