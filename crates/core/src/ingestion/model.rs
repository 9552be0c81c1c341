use cardprice_market_data::errors::FailureKind;
use cardprice_market_data::SourceId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ingestion trigger payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionRequest {
    pub source: SourceId,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub market_item_ids: Option<Vec<String>>,
    /// Inline observations, honoured only for the manual source.
    #[serde(default)]
    pub observations: Vec<ManualObservation>,
}

impl IngestionRequest {
    pub fn for_source(source: SourceId) -> Self {
        Self {
            source,
            category: None,
            limit: None,
            market_item_ids: None,
            observations: Vec::new(),
        }
    }
}

/// Operator-supplied observation for the manual source.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualObservation {
    pub market_item_id: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    /// Defaults to the catalog item's name.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_event_id: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Summary returned by an ingestion trigger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    pub source: SourceId,
    pub items_processed: usize,
    pub events_recorded: usize,
    pub items_matched: usize,
    pub queued_for_review: usize,
    pub outliers: usize,
    pub prices_updated: usize,
    pub prices_rejected: usize,
    pub errors: Vec<String>,
}

impl IngestionResult {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            items_processed: 0,
            events_recorded: 0,
            items_matched: 0,
            queued_for_review: 0,
            outliers: 0,
            prices_updated: 0,
            prices_rejected: 0,
            errors: Vec::new(),
        }
    }

    pub(crate) fn add_item(&mut self, item: ItemIngestion) {
        self.items_processed += 1;
        self.events_recorded += item.events_recorded;
        self.queued_for_review += item.queued_for_review;
        self.outliers += item.outliers;
        if item.matched {
            self.items_matched += 1;
        }
        match &item.outcome {
            ItemOutcome::Updated { .. } => self.prices_updated += 1,
            ItemOutcome::Rejected { .. } => self.prices_rejected += 1,
            ItemOutcome::FetchFailed { kind, message } if kind.is_failure() => {
                self.errors.push(format!("{}: {}", item.item_id, message))
            }
            _ => {}
        }
        self.errors.extend(item.errors);
    }
}

/// Terminal result of one item against one source.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// The validator accepted the candidate price.
    Updated { price: Decimal },
    /// The validator judged the candidate price suspicious.
    Rejected { reason: String },
    /// Nothing qualified for the validator.
    NoUsablePrice,
    /// The source call failed.
    FetchFailed { kind: FailureKind, message: String },
    /// A write needed to reach a decision failed.
    PersistFailed,
}

/// Per-item ingestion record.
#[derive(Debug, Clone)]
pub struct ItemIngestion {
    pub item_id: String,
    pub source: SourceId,
    pub events_recorded: usize,
    /// At least one observation cleared the auto-match threshold.
    pub matched: bool,
    pub queued_for_review: usize,
    pub outliers: usize,
    pub outcome: ItemOutcome,
    /// Persistence errors, prefixed with the item id.
    pub errors: Vec<String>,
}

impl ItemIngestion {
    pub(crate) fn new(item_id: &str, source: SourceId) -> Self {
        Self {
            item_id: item_id.to_string(),
            source,
            events_recorded: 0,
            matched: false,
            queued_for_review: 0,
            outliers: 0,
            outcome: ItemOutcome::NoUsablePrice,
            errors: Vec::new(),
        }
    }
}
