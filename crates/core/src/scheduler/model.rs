use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cardprice_market_data::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which items a scheduler run refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Priced items, stalest first.
    MaxThroughput,
    /// Trending or heavily viewed items.
    HighPriority,
    /// Items with active listings.
    MediumPriority,
    /// Items past the staleness window.
    LowPriority,
    /// The whole catalog.
    FullSync,
}

impl ScheduleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleMode::MaxThroughput => "max_throughput",
            ScheduleMode::HighPriority => "high_priority",
            ScheduleMode::MediumPriority => "medium_priority",
            ScheduleMode::LowPriority => "low_priority",
            ScheduleMode::FullSync => "full_sync",
        }
    }
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_throughput" => Ok(ScheduleMode::MaxThroughput),
            "high_priority" => Ok(ScheduleMode::HighPriority),
            "medium_priority" => Ok(ScheduleMode::MediumPriority),
            "low_priority" => Ok(ScheduleMode::LowPriority),
            "full_sync" => Ok(ScheduleMode::FullSync),
            other => Err(format!("unknown schedule mode '{}'", other)),
        }
    }
}

/// Scheduler trigger payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerRequest {
    pub mode: ScheduleMode,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

impl SchedulerRequest {
    pub fn new(mode: ScheduleMode) -> Self {
        Self {
            mode,
            batch_size: None,
            delay_ms: None,
        }
    }
}

/// Terminal state of one item in a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    Updated { source: SourceId },
    Rejected { source: SourceId, reason: String },
    Skipped { reason: String },
    Failed { reason: String },
}

/// How one source attempt for an item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    Updated,
    Rejected,
    Skipped,
    Failed,
}

/// Per-item run record: the sources attempted, in order, and the final state.
#[derive(Debug, Clone)]
pub struct ItemRunResult {
    pub item_id: String,
    pub attempts: Vec<(SourceId, AttemptResult)>,
    pub state: ItemState,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCounters {
    pub attempted: usize,
    pub updated: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Summary returned by a scheduler run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerRunSummary {
    pub run_id: String,
    pub mode: ScheduleMode,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub selected: usize,
    pub updated: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
    pub per_source: BTreeMap<String, SourceCounters>,
    pub errors: Vec<String>,
}

impl SchedulerRunSummary {
    pub(crate) fn new(run_id: String, mode: ScheduleMode, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            mode,
            started_at,
            duration_ms: 0,
            selected: 0,
            updated: 0,
            rejected: 0,
            skipped: 0,
            failed: 0,
            per_source: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn add_item(&mut self, result: ItemRunResult) {
        for (source, attempt) in &result.attempts {
            let counters = self.per_source.entry(source.to_string()).or_default();
            counters.attempted += 1;
            match attempt {
                AttemptResult::Updated => counters.updated += 1,
                AttemptResult::Rejected => counters.rejected += 1,
                AttemptResult::Skipped => counters.skipped += 1,
                AttemptResult::Failed => counters.failed += 1,
            }
        }

        match &result.state {
            ItemState::Updated { .. } => self.updated += 1,
            ItemState::Rejected { .. } => self.rejected += 1,
            ItemState::Skipped { .. } => self.skipped += 1,
            ItemState::Failed { reason } => {
                self.failed += 1;
                if result.errors.is_empty() {
                    self.errors.push(format!("{}: {}", result.item_id, reason));
                }
            }
        }
        self.errors.extend(result.errors);
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
