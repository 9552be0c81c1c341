//! PriceCharting price source.
//!
//! General cross-category lookup. One product per request, all prices in
//! USD cents. For trading card games the condition columns carry graded
//! tiers:
//!
//! | field           | grade   |
//! |-----------------|---------|
//! | `loose-price`   | raw     |
//! | `cib-price`     | PSA 7   |
//! | `new-price`     | PSA 8   |
//! | `graded-price`  | PSA 9   |
//! | `box-only-price`| PSA 9.5 |
//! | `manual-only-price` | PSA 10 |
//! | `bgs-10-price`  | BGS 10  |
//! | `condition-17-price` | CGC 10 |

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::errors::SourceError;
use crate::models::{Game, Grade, GradedPrice, ItemLookup, RawObservation, SourceId};
use crate::provider::{price_from_cents, PriceSource, RateLimit, SourceCapabilities, SupportedGames};

const DEFAULT_BASE_URL: &str = "https://www.pricecharting.com";
const SOURCE: &str = "pricecharting";
const CURRENCY: &str = "USD";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const GRADED_GAMES: &[Game] = &[
    Game::Pokemon,
    Game::Yugioh,
    Game::Mtg,
    Game::OnePiece,
    Game::Lorcana,
];

#[derive(Debug, Deserialize, Serialize)]
struct ProductResponse {
    status: String,
    #[serde(rename = "error-message", default)]
    error_message: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "product-name", default)]
    product_name: Option<String>,
    #[serde(rename = "console-name", default)]
    console_name: Option<String>,
    #[serde(rename = "loose-price", default)]
    loose_price: Option<i64>,
    #[serde(rename = "cib-price", default)]
    cib_price: Option<i64>,
    #[serde(rename = "new-price", default)]
    new_price: Option<i64>,
    #[serde(rename = "graded-price", default)]
    graded_price: Option<i64>,
    #[serde(rename = "box-only-price", default)]
    box_only_price: Option<i64>,
    #[serde(rename = "manual-only-price", default)]
    manual_only_price: Option<i64>,
    #[serde(rename = "bgs-10-price", default)]
    bgs_10_price: Option<i64>,
    #[serde(rename = "condition-17-price", default)]
    condition_17_price: Option<i64>,
}

impl ProductResponse {
    fn graded_prices(&self) -> Vec<GradedPrice> {
        [
            (Grade::Raw, self.loose_price),
            (Grade::Psa7, self.cib_price),
            (Grade::Psa8, self.new_price),
            (Grade::Psa9, self.graded_price),
            (Grade::Psa9_5, self.box_only_price),
            (Grade::Psa10, self.manual_only_price),
            (Grade::Bgs10, self.bgs_10_price),
            (Grade::Cgc10, self.condition_17_price),
        ]
        .into_iter()
        .filter_map(|(grade, cents)| {
            cents
                .and_then(price_from_cents)
                .map(|price| GradedPrice { grade, price })
        })
        .collect()
    }
}

/// PriceCharting price source.
pub struct PriceChartingSource {
    client: Client,
    token: String,
    base_url: String,
}

impl PriceChartingSource {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Parse a product response into at most one observation.
    ///
    /// `today` stamps the observation and its event id: the product endpoint
    /// returns current guide prices only, so one trend event per product per
    /// day.
    fn parse_response(
        body: &str,
        game: Game,
        today: NaiveDate,
    ) -> Result<Vec<RawObservation>, SourceError> {
        let response: ProductResponse =
            serde_json::from_str(body).map_err(|e| SourceError::parse(SOURCE, e.to_string()))?;

        if response.status != "success" {
            let message = response
                .error_message
                .clone()
                .unwrap_or_else(|| format!("status {}", response.status));
            // "No such product" is an empty result, not a failure.
            if message.to_lowercase().contains("no such product") {
                return Ok(Vec::new());
            }
            return Err(SourceError::parse(SOURCE, message));
        }

        let Some(product_id) = response.id.clone() else {
            return Ok(Vec::new());
        };

        let mut grades = if GRADED_GAMES.contains(&game) {
            response.graded_prices()
        } else {
            Vec::new()
        };

        let headline = grades
            .iter()
            .find(|g| g.grade == Grade::Raw)
            .map(|g| g.price)
            .or_else(|| response.loose_price.and_then(price_from_cents));
        let Some(price) = headline else {
            return Ok(Vec::new());
        };
        if grades.len() == 1 {
            // Raw alone adds nothing over the headline price.
            grades.clear();
        }

        let title = response.product_name.clone().unwrap_or_default();
        let mut observation = RawObservation::trend(title, price, CURRENCY);
        observation.source_event_id = Some(format!("{}:{}", product_id, today.format("%Y-%m-%d")));
        observation.description = response.console_name.clone();
        observation.observed_at = today
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
        observation.grades = grades;
        observation.payload = serde_json::to_value(&response).unwrap_or(serde_json::Value::Null);

        Ok(vec![observation])
    }
}

#[async_trait]
impl PriceSource for PriceChartingSource {
    fn id(&self) -> SourceId {
        SourceId::PriceCharting
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            games: SupportedGames::All,
            structured_identifiers: false,
            graded_games: GRADED_GAMES,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60,
            max_concurrency: 1,
            min_delay: Duration::from_millis(300),
        }
    }

    async fn fetch_observations(
        &self,
        lookup: &ItemLookup,
    ) -> Result<Vec<RawObservation>, SourceError> {
        let query = lookup.search_query();
        if query.is_empty() {
            return Err(SourceError::InsufficientIdentifiers {
                source_id: SOURCE.to_string(),
                message: "item has no name".to_string(),
            });
        }

        let url = format!(
            "{}/api/product?t={}&q={}",
            self.base_url,
            encode(&self.token),
            encode(&query)
        );
        debug!("PriceCharting lookup for {}: {}", lookup.item_id, query);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(SOURCE, status));
        }

        let body = response.text().await?;
        Self::parse_response(&body, lookup.game(), Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    const CHARIZARD: &str = r#"{
        "status": "success",
        "id": "6910",
        "product-name": "Charizard #4",
        "console-name": "Pokemon Base Set",
        "loose-price": 31000,
        "cib-price": 45000,
        "new-price": 60000,
        "graded-price": 98000,
        "manual-only-price": 550000,
        "bgs-10-price": 900000
    }"#;

    #[test]
    fn test_parse_maps_condition_columns_to_grades() {
        let observations =
            PriceChartingSource::parse_response(CHARIZARD, Game::Pokemon, day()).unwrap();
        assert_eq!(observations.len(), 1);

        let observation = &observations[0];
        assert_eq!(observation.event_type, EventType::Trend);
        assert_eq!(observation.price, dec!(310.00));
        assert_eq!(observation.currency, "USD");
        assert_eq!(observation.source_event_id.as_deref(), Some("6910:2024-03-01"));

        let grades: Vec<(Grade, rust_decimal::Decimal)> = observation
            .grades
            .iter()
            .map(|g| (g.grade, g.price))
            .collect();
        assert_eq!(
            grades,
            vec![
                (Grade::Raw, dec!(310.00)),
                (Grade::Psa7, dec!(450.00)),
                (Grade::Psa8, dec!(600.00)),
                (Grade::Psa9, dec!(980.00)),
                (Grade::Psa10, dec!(5500.00)),
                (Grade::Bgs10, dec!(9000.00)),
            ]
        );
    }

    #[test]
    fn test_parse_skips_grades_outside_card_games() {
        let observations =
            PriceChartingSource::parse_response(CHARIZARD, Game::Sports, day()).unwrap();
        assert_eq!(observations[0].price, dec!(310.00));
        assert!(observations[0].grades.is_empty());
    }

    #[test]
    fn test_parse_no_such_product_is_empty() {
        let body = r#"{"status": "error", "error-message": "No such product"}"#;
        let observations =
            PriceChartingSource::parse_response(body, Game::Pokemon, day()).unwrap();
        assert!(observations.is_empty());
    }

    #[test]
    fn test_parse_other_error_status_fails() {
        let body = r#"{"status": "error", "error-message": "Invalid access token"}"#;
        let result = PriceChartingSource::parse_response(body, Game::Pokemon, day());
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }

    #[test]
    fn test_parse_without_loose_price_is_empty() {
        let body = r#"{"status": "success", "id": "1", "product-name": "Sealed Box"}"#;
        let observations =
            PriceChartingSource::parse_response(body, Game::Pokemon, day()).unwrap();
        assert!(observations.is_empty());
    }
}
