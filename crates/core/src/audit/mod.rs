//! Scheduler run audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// One row per scheduler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub run_id: String,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub items_selected: i64,
    pub updated: i64,
    pub rejected: i64,
    pub skipped: i64,
    pub failed: i64,
    /// Per-source counters as a JSON object keyed by source id.
    pub per_source: serde_json::Value,
    pub error_count: i64,
}

#[async_trait]
pub trait AuditLogRepositoryTrait: Send + Sync {
    async fn insert_entry(&self, entry: AuditLogEntry) -> Result<()>;

    /// Most recent entries first.
    fn list_recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>>;
}
