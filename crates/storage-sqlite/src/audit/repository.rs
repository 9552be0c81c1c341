use std::sync::Arc;

use async_trait::async_trait;
use cardprice_core::audit::{AuditLogEntry, AuditLogRepositoryTrait};
use cardprice_core::Result;
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::model::AuditLogDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::scheduler_audit_log;

pub struct AuditLogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AuditLogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AuditLogRepository { pool, writer }
    }
}

#[async_trait]
impl AuditLogRepositoryTrait for AuditLogRepository {
    async fn insert_entry(&self, entry: AuditLogEntry) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(scheduler_audit_log::table)
                    .values(AuditLogDB::from(entry))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = scheduler_audit_log::table
            .order((scheduler_audit_log::started_at.desc(), scheduler_audit_log::id.desc()))
            .limit(limit as i64)
            .select(AuditLogDB::as_select())
            .load::<AuditLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}
