use diesel::prelude::*;

use cardprice_core::audit::AuditLogEntry;

use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::scheduler_audit_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditLogDB {
    pub id: String,
    pub run_id: String,
    pub mode: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_ms: i64,
    pub items_selected: i64,
    pub updated: i64,
    pub rejected: i64,
    pub skipped: i64,
    pub failed: i64,
    pub per_source: String,
    pub error_count: i64,
}

impl From<AuditLogDB> for AuditLogEntry {
    fn from(db: AuditLogDB) -> Self {
        Self {
            id: db.id,
            run_id: db.run_id,
            mode: db.mode,
            started_at: parse_timestamp(&db.started_at),
            finished_at: parse_timestamp(&db.finished_at),
            duration_ms: db.duration_ms,
            items_selected: db.items_selected,
            updated: db.updated,
            rejected: db.rejected,
            skipped: db.skipped,
            failed: db.failed,
            per_source: serde_json::from_str(&db.per_source)
                .unwrap_or_else(|_| serde_json::json!({})),
            error_count: db.error_count,
        }
    }
}

impl From<AuditLogEntry> for AuditLogDB {
    fn from(domain: AuditLogEntry) -> Self {
        Self {
            id: domain.id,
            run_id: domain.run_id,
            mode: domain.mode,
            started_at: format_timestamp(domain.started_at),
            finished_at: format_timestamp(domain.finished_at),
            duration_ms: domain.duration_ms,
            items_selected: domain.items_selected,
            updated: domain.updated,
            rejected: domain.rejected,
            skipped: domain.skipped,
            failed: domain.failed,
            per_source: domain.per_source.to_string(),
            error_count: domain.error_count,
        }
    }
}
