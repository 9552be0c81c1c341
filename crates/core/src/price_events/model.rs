use cardprice_market_data::EventType;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One stored external price observation.
///
/// Unique by (`source`, `source_event_id`); re-ingestion updates the row in
/// place and keeps `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEvent {
    pub id: String,
    pub source: String,
    pub source_event_id: String,
    pub payload: serde_json::Value,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub event_type: EventType,
    pub observed_at: Option<DateTime<Utc>>,
    /// Set only when the match cleared the auto-match threshold.
    pub market_item_id: Option<String>,
    pub match_confidence: f64,
    pub is_outlier: bool,
    pub outlier_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event id for sources that expose none: `gen-<unix millis>-<8 alphanumerics>`.
pub fn generate_event_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("gen-{}-{}", now.timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_event_id_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let id = generate_event_id(now);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "gen");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_event_id(now));
    }
}
