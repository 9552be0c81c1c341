use std::sync::Arc;

use async_trait::async_trait;
use cardprice_core::review::{MatchReviewEntry, ReviewRepositoryTrait, ReviewStatus};
use cardprice_core::Result;
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::model::MatchReviewDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::match_review_queue;

pub struct ReviewRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ReviewRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ReviewRepository { pool, writer }
    }
}

#[async_trait]
impl ReviewRepositoryTrait for ReviewRepository {
    async fn insert_if_absent(&self, entry: MatchReviewEntry) -> Result<bool> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let inserted = diesel::insert_into(match_review_queue::table)
                    .values(MatchReviewDB::from(entry))
                    .on_conflict(match_review_queue::price_event_id)
                    .do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted > 0)
            })
            .await
    }

    fn list_pending(&self, limit: usize) -> Result<Vec<MatchReviewEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = match_review_queue::table
            .filter(match_review_queue::status.eq(ReviewStatus::Pending.as_str()))
            .order((match_review_queue::created_at.asc(), match_review_queue::id.asc()))
            .limit(limit as i64)
            .select(MatchReviewDB::as_select())
            .load::<MatchReviewDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(MatchReviewEntry::from).collect())
    }
}
