//! Scheduled price refresh.
//!
//! - [`model`] - Modes, trigger payload and run summary
//! - [`selection`] - Mode to catalog filter and batch size
//! - [`lease`] - Persisted run lease preventing overlapping runs
//! - [`service`] - The orchestrator walking items through the fallback chain

pub mod lease;
pub mod model;
pub mod selection;
pub mod service;


pub use lease::{RunLease, RunLeaseStore, SCHEDULER_LEASE};
pub use model::{
    AttemptResult, ItemRunResult, ItemState, ScheduleMode, SchedulerRequest,
    SchedulerRunSummary, SourceCounters,
};
pub use selection::{batch_size, refresh_filter};
pub use service::SchedulerOrchestrator;
