//! Persisted run lease.
//!
//! Scheduler runs hold a named lease for their duration. A lease that is not
//! released (crashed process) lapses after its TTL.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::errors::Result;

/// Lease name held by scheduler runs.
pub const SCHEDULER_LEASE: &str = "scheduler";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLease {
    pub name: String,
    pub holder: String,
    pub expires_at: DateTime<Utc>,
}

impl RunLease {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[async_trait]
pub trait RunLeaseStore: Send + Sync {
    /// Take the lease if it is free, expired or already ours.
    ///
    /// Returns whether `holder` now holds it.
    async fn try_acquire(&self, name: &str, holder: &str, ttl: Duration) -> Result<bool>;

    /// Release the lease if `holder` holds it.
    async fn release(&self, name: &str, holder: &str) -> Result<()>;

    fn current(&self, name: &str) -> Result<Option<RunLease>>;
}
