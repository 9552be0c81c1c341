//! Background refresh loop.
//!
//! Runs `max_throughput` passes at a fixed interval when
//! `CP_SCHEDULE_INTERVAL_SECS` is set.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use cardprice_core::scheduler::{ScheduleMode, SchedulerRequest};
use cardprice_core::Error;

use crate::main_lib::AppState;

/// Initial delay before the first run, to let the server fully start.
const INITIAL_DELAY_SECS: u64 = 30;

pub fn start_refresh_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        info!("Refresh scheduler started ({}s interval)", every.as_secs());
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_scheduled_refresh(&state).await;
        }
    });
}

async fn run_scheduled_refresh(state: &Arc<AppState>) {
    match state
        .scheduler
        .run(SchedulerRequest::new(ScheduleMode::MaxThroughput))
        .await
    {
        Ok(summary) => info!(
            "Scheduled refresh {} done: {} selected, {} updated, {} failed",
            summary.run_id, summary.selected, summary.updated, summary.failed
        ),
        Err(Error::RunInProgress(holder)) => {
            debug!("Scheduled refresh skipped: run {} in progress", holder)
        }
        Err(e) => warn!("Scheduled refresh failed: {}", e),
    }
}
