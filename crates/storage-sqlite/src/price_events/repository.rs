use std::sync::Arc;

use async_trait::async_trait;
use cardprice_core::price_events::{PriceEvent, PriceEventRepositoryTrait};
use cardprice_core::Result;
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::model::{PriceEventChangeset, PriceEventDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::price_events;

pub struct PriceEventRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceEventRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PriceEventRepository { pool, writer }
    }
}

#[async_trait]
impl PriceEventRepositoryTrait for PriceEventRepository {
    async fn upsert_event(&self, event: PriceEvent) -> Result<PriceEvent> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PriceEvent> {
                let row: PriceEventDB = event.into();
                diesel::insert_into(price_events::table)
                    .values(&row)
                    .on_conflict((price_events::source, price_events::source_event_id))
                    .do_update()
                    .set(PriceEventChangeset::from(&row))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let stored = price_events::table
                    .filter(price_events::source.eq(&row.source))
                    .filter(price_events::source_event_id.eq(&row.source_event_id))
                    .select(PriceEventDB::as_select())
                    .first::<PriceEventDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(stored.into())
            })
            .await
    }

    fn get_by_source_event(
        &self,
        source: &str,
        source_event_id: &str,
    ) -> Result<Option<PriceEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let row = price_events::table
            .filter(price_events::source.eq(source))
            .filter(price_events::source_event_id.eq(source_event_id))
            .select(PriceEventDB::as_select())
            .first::<PriceEventDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PriceEvent::from))
    }

    fn list_for_item(&self, market_item_id: &str) -> Result<Vec<PriceEvent>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = price_events::table
            .filter(price_events::market_item_id.eq(market_item_id))
            .order((price_events::created_at.desc(), price_events::id.desc()))
            .select(PriceEventDB::as_select())
            .load::<PriceEventDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PriceEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRepository;
    use crate::test_utils::{item, test_db};
    use cardprice_core::catalog::CatalogRepositoryTrait;
    use cardprice_market_data::EventType;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn event(source_event_id: &str) -> PriceEvent {
        let now = Utc::now();
        PriceEvent {
            id: uuid::Uuid::new_v4().to_string(),
            source: "ebay".to_string(),
            source_event_id: source_event_id.to_string(),
            payload: serde_json::json!({ "itemId": source_event_id }),
            title: "Charizard Base Set".to_string(),
            price: dec!(50.00),
            currency: "USD".to_string(),
            event_type: EventType::Sale,
            observed_at: Some(now - Duration::days(1)),
            market_item_id: None,
            match_confidence: 0.5,
            is_outlier: false,
            outlier_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_reingest_updates_in_place() {
        let (pool, writer, _temp_dir) = test_db();
        let catalog = CatalogRepository::new(pool.clone(), writer.clone());
        catalog.upsert_items(vec![item("card-1", "pokemon")]).await.unwrap();
        let repo = PriceEventRepository::new(pool, writer);

        let first = repo.upsert_event(event("123")).await.unwrap();
        assert_eq!(first.market_item_id, None);
        assert_eq!(first.payload["itemId"], "123");

        let mut again = event("123");
        again.price = dec!(55.00);
        again.market_item_id = Some("card-1".to_string());
        again.match_confidence = 0.95;
        again.updated_at = first.updated_at + Duration::minutes(5);
        let second = repo.upsert_event(again).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.price, dec!(55.00));
        assert_eq!(second.market_item_id.as_deref(), Some("card-1"));
        assert!(second.updated_at > first.updated_at);

        let matched = repo.list_for_item("card-1").unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, first.id);
    }

    #[tokio::test]
    async fn test_same_event_id_from_other_source_is_separate() {
        let (pool, writer, _temp_dir) = test_db();
        let repo = PriceEventRepository::new(pool, writer);

        let ebay = repo.upsert_event(event("123")).await.unwrap();
        let mut other = event("123");
        other.source = "cardmarket".to_string();
        let cardmarket = repo.upsert_event(other).await.unwrap();

        assert_ne!(ebay.id, cardmarket.id);
        assert!(repo.get_by_source_event("cardmarket", "123").unwrap().is_some());
        assert!(repo.get_by_source_event("pricecharting", "123").unwrap().is_none());
    }
}
