use chrono::{DateTime, Duration, Utc};

use super::model::ScheduleMode;
use crate::catalog::RefreshFilter;
use crate::config::SchedulerConfig;

/// Catalog filter for a mode.
pub fn refresh_filter(
    mode: ScheduleMode,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> RefreshFilter {
    match mode {
        ScheduleMode::MaxThroughput => RefreshFilter::Priced,
        ScheduleMode::HighPriority => RefreshFilter::InDemand {
            min_views: config.trending_view_threshold,
        },
        ScheduleMode::MediumPriority => RefreshFilter::ActivelyListed,
        ScheduleMode::LowPriority => RefreshFilter::StaleSince {
            cutoff: now - Duration::hours(config.staleness_hours),
        },
        ScheduleMode::FullSync => RefreshFilter::All,
    }
}

/// Batch size for a run: the request's, else the mode default.
pub fn batch_size(mode: ScheduleMode, requested: Option<usize>, config: &SchedulerConfig) -> usize {
    match requested {
        Some(size) if size > 0 => size,
        _ if mode == ScheduleMode::FullSync => config.full_sync_batch_size,
        _ => config.default_batch_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_priority_cutoff() {
        let config = SchedulerConfig::default();
        let now = Utc::now();
        assert_eq!(
            refresh_filter(ScheduleMode::LowPriority, &config, now),
            RefreshFilter::StaleSince {
                cutoff: now - Duration::hours(6)
            }
        );
    }

    #[test]
    fn test_batch_sizes() {
        let config = SchedulerConfig::default();
        assert_eq!(batch_size(ScheduleMode::MaxThroughput, None, &config), 100);
        assert_eq!(batch_size(ScheduleMode::FullSync, None, &config), 500);
        assert_eq!(batch_size(ScheduleMode::FullSync, Some(20), &config), 20);
        assert_eq!(batch_size(ScheduleMode::HighPriority, Some(0), &config), 100);
    }
}
