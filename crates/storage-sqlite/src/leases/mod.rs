//! Persisted run leases.

use std::sync::Arc;

use async_trait::async_trait;
use cardprice_core::scheduler::{RunLease, RunLeaseStore};
use cardprice_core::Result;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::run_leases;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::run_leases)]
#[diesel(primary_key(name))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RunLeaseDB {
    pub name: String,
    pub holder: String,
    pub expires_at: String,
}

impl From<RunLeaseDB> for RunLease {
    fn from(db: RunLeaseDB) -> Self {
        Self {
            name: db.name,
            holder: db.holder,
            expires_at: parse_timestamp(&db.expires_at),
        }
    }
}

pub struct RunLeaseRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RunLeaseRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        RunLeaseRepository { pool, writer }
    }
}

#[async_trait]
impl RunLeaseStore for RunLeaseRepository {
    async fn try_acquire(&self, name: &str, holder: &str, ttl: Duration) -> Result<bool> {
        let name = name.to_string();
        let holder = holder.to_string();
        // Check and write happen in one immediate transaction on the writer.
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let now = Utc::now();
                let existing = run_leases::table
                    .find(&name)
                    .select(RunLeaseDB::as_select())
                    .first::<RunLeaseDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .map(RunLease::from);

                if let Some(lease) = existing {
                    if lease.holder != holder && !lease.is_expired(now) {
                        return Ok(false);
                    }
                }

                let row = RunLeaseDB {
                    name,
                    holder,
                    expires_at: format_timestamp(now + ttl),
                };
                diesel::insert_into(run_leases::table)
                    .values(&row)
                    .on_conflict(run_leases::name)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(true)
            })
            .await
    }

    async fn release(&self, name: &str, holder: &str) -> Result<()> {
        let name = name.to_string();
        let holder = holder.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(
                    run_leases::table
                        .filter(run_leases::name.eq(&name))
                        .filter(run_leases::holder.eq(&holder)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn current(&self, name: &str) -> Result<Option<RunLease>> {
        let mut conn = get_connection(&self.pool)?;
        let lease = run_leases::table
            .find(name)
            .select(RunLeaseDB::as_select())
            .first::<RunLeaseDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(RunLease::from);
        Ok(lease.filter(|l| !l.is_expired(Utc::now())))
    }
}
