use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of price signal an observation carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// An individual completed sale.
    Sale,
    /// An aggregated market trend (trend price, average sell price, guide price).
    Trend,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Sale => "sale",
            EventType::Trend => "trend",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(EventType::Sale),
            "trend" => Some(EventType::Trend),
            _ => None,
        }
    }
}

/// Professional condition grade tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Raw,
    Psa7,
    Psa8,
    Psa9,
    Psa9_5,
    Psa10,
    Bgs10,
    Cgc10,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Raw => "raw",
            Grade::Psa7 => "psa7",
            Grade::Psa8 => "psa8",
            Grade::Psa9 => "psa9",
            Grade::Psa9_5 => "psa9_5",
            Grade::Psa10 => "psa10",
            Grade::Bgs10 => "bgs10",
            Grade::Cgc10 => "cgc10",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "raw" => Some(Grade::Raw),
            "psa7" => Some(Grade::Psa7),
            "psa8" => Some(Grade::Psa8),
            "psa9" => Some(Grade::Psa9),
            "psa9_5" => Some(Grade::Psa9_5),
            "psa10" => Some(Grade::Psa10),
            "bgs10" => Some(Grade::Bgs10),
            "cgc10" => Some(Grade::Cgc10),
            _ => None,
        }
    }
}

/// Price for a single grade tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradedPrice {
    pub grade: Grade,
    pub price: Decimal,
}

/// One raw price observation returned by a source, before matching.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawObservation {
    /// Source-provided identifier; `None` when the source exposes none.
    pub source_event_id: Option<String>,

    /// Listing title or product name as shown by the source.
    pub title: String,

    /// Optional free-text description (listing subtitle, condition notes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub event_type: EventType,

    /// Headline price (sold price for sales, trend/raw price otherwise).
    pub price: Decimal,

    pub currency: String,

    /// Sold date or quote time as reported by the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,

    /// Structured collector number, when the source exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,

    /// Structured set code, when the source exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,

    /// Graded tiers carried by richer payloads.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grades: Vec<GradedPrice>,

    /// Source payload kept verbatim for the audit trail.
    pub payload: serde_json::Value,
}

impl RawObservation {
    /// Minimal sale observation.
    pub fn sale(title: impl Into<String>, price: Decimal, currency: impl Into<String>) -> Self {
        Self {
            source_event_id: None,
            title: title.into(),
            description: None,
            event_type: EventType::Sale,
            price,
            currency: currency.into(),
            observed_at: None,
            card_number: None,
            set_code: None,
            grades: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    /// Minimal trend observation.
    pub fn trend(title: impl Into<String>, price: Decimal, currency: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Trend,
            ..Self::sale(title, price, currency)
        }
    }

    /// Whether the source exposed structured identifiers for this observation.
    pub fn has_structured_identifiers(&self) -> bool {
        self.card_number.is_some()
    }
}
