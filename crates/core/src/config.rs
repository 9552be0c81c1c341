//! Engine configuration.
//!
//! Every tunable of the engine lives here with its default. Components take
//! the section they need in their constructor. A JSON file may override any
//! subset of fields.

use std::path::Path;

use cardprice_market_data::SourceId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Blocklist applied to listing titles and descriptions.
pub const DEFAULT_OUTLIER_TERMS: &[&str] = &[
    "lot", "lots", "bundle", "bulk", "proxy", "custom", "orica", "digital", "code card",
    "damaged", "empty", "box only", "no cards", "repack", "mystery",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub matching: MatchThresholds,
    pub price_bounds: PriceBounds,
    pub outliers: OutlierConfig,
    pub ingestion: IngestionConfig,
    pub scheduler: SchedulerConfig,
}

/// Confidence cut-offs for the ingestion gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchThresholds {
    /// At or above: the observation may update the catalog.
    pub auto_match: f64,
    /// At or above (and below `auto_match`): queued for manual review.
    pub review_min: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            auto_match: 0.90,
            review_min: 0.70,
        }
    }
}

/// Accepted band for a new price relative to the current one, inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriceBounds {
    pub min_ratio: Decimal,
    pub max_ratio: Decimal,
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min_ratio: dec!(0.2),
            max_ratio: dec!(5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlierConfig {
    pub blocklist: Vec<String>,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            blocklist: DEFAULT_OUTLIER_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestionConfig {
    /// Items per ingestion trigger when the request gives no limit.
    pub default_limit: usize,
    /// Items processed concurrently.
    pub max_concurrent_items: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_concurrent_items: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    pub default_batch_size: usize,
    pub full_sync_batch_size: usize,
    /// Items refreshed within this window are not stale.
    pub staleness_hours: i64,
    /// Minimum recent views for an item to count as in demand.
    pub trending_view_threshold: i64,
    /// Post-call delay for every source; `None` keeps each source's own.
    pub delay_ms: Option<u64>,
    pub max_concurrent_items: usize,
    /// Items not started within this many seconds of the run start are skipped.
    pub run_deadline_secs: Option<u64>,
    pub lease_ttl_secs: u64,
    pub fallback_order: Vec<SourceId>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 100,
            full_sync_batch_size: 500,
            staleness_hours: 6,
            trending_view_threshold: 25,
            delay_ms: None,
            max_concurrent_items: 4,
            run_deadline_secs: None,
            lease_ttl_secs: 15 * 60,
            fallback_order: vec![SourceId::Cardmarket, SourceId::PriceCharting, SourceId::Ebay],
        }
    }
}

impl EngineConfig {
    /// Load overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidConfigValue(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        if !(0.0..=1.0).contains(&m.review_min)
            || !(0.0..=1.0).contains(&m.auto_match)
            || m.review_min > m.auto_match
        {
            return Err(Error::InvalidConfigValue(format!(
                "match thresholds must satisfy 0 <= reviewMin <= autoMatch <= 1 (got {} / {})",
                m.review_min, m.auto_match
            )));
        }

        let b = &self.price_bounds;
        if b.min_ratio <= Decimal::ZERO || b.min_ratio > b.max_ratio {
            return Err(Error::InvalidConfigValue(format!(
                "price bounds must satisfy 0 < minRatio <= maxRatio (got {} / {})",
                b.min_ratio, b.max_ratio
            )));
        }

        if self.scheduler.fallback_order.is_empty() {
            return Err(Error::InvalidConfigValue(
                "scheduler.fallbackOrder must name at least one source".to_string(),
            ));
        }
        if self.scheduler.fallback_order.contains(&SourceId::Manual) {
            return Err(Error::InvalidConfigValue(
                "manual source cannot be part of the fallback order".to_string(),
            ));
        }
        if self.scheduler.max_concurrent_items == 0 || self.ingestion.max_concurrent_items == 0 {
            return Err(Error::InvalidConfigValue(
                "maxConcurrentItems must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
