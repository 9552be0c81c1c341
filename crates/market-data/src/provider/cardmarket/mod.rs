//! Cardmarket price source.
//!
//! Structured per-game card API returning card identity together with the
//! Cardmarket trend and average sell prices. The response shape follows the
//! pokemontcg.io `v2/cards` endpoint:
//!
//! ```text
//! { "data": [ { "id", "name", "number", "set": { "id" },
//!               "cardmarket": { "updatedAt", "prices": { "trendPrice", "averageSellPrice" } } } ] }
//! ```
//!
//! Prices are quoted in EUR.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use urlencoding::encode;

use crate::errors::SourceError;
use crate::models::{Game, ItemLookup, RawObservation, SourceId};
use crate::provider::{price_from_f64, PriceSource, RateLimit, SourceCapabilities, SupportedGames};

const DEFAULT_BASE_URL: &str = "https://api.pokemontcg.io/v2";
const SOURCE: &str = "cardmarket";
const CURRENCY: &str = "EUR";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SUPPORTED_GAMES: &[Game] = &[Game::Pokemon];

#[derive(Debug, Deserialize)]
struct CardsResponse {
    #[serde(default)]
    data: Vec<CardEntry>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct CardEntry {
    id: String,
    name: String,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    set: Option<CardSet>,
    #[serde(default)]
    cardmarket: Option<CardmarketBlock>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct CardSet {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CardmarketBlock {
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    prices: Option<CardmarketPrices>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CardmarketPrices {
    #[serde(default)]
    trend_price: Option<f64>,
    #[serde(default)]
    average_sell_price: Option<f64>,
}

/// Cardmarket price source.
pub struct CardmarketSource {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CardmarketSource {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a source pointing at a different endpoint (proxy or test server).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_query(lookup: &ItemLookup) -> Result<String, SourceError> {
        match (lookup.set_code.as_deref(), lookup.card_number.as_deref()) {
            (Some(set), Some(number)) if !set.trim().is_empty() && !number.trim().is_empty() => {
                let number = number.split('/').next().unwrap_or(number).trim();
                Ok(format!("set.id:{} number:{}", set.trim(), number))
            }
            _ if !lookup.name.trim().is_empty() => {
                Ok(format!("name:\"{}\"", lookup.name.trim()))
            }
            _ => Err(SourceError::InsufficientIdentifiers {
                source_id: SOURCE.to_string(),
                message: "need set code and number, or a name".to_string(),
            }),
        }
    }

    fn parse_response(body: &str) -> Result<Vec<RawObservation>, SourceError> {
        let response: CardsResponse =
            serde_json::from_str(body).map_err(|e| SourceError::parse(SOURCE, e.to_string()))?;

        let observations = response
            .data
            .into_iter()
            .filter_map(Self::card_to_observation)
            .collect();

        Ok(observations)
    }

    fn card_to_observation(card: CardEntry) -> Option<RawObservation> {
        let market = card.cardmarket.as_ref()?;
        let prices = market.prices.as_ref()?;
        let price = prices
            .trend_price
            .and_then(price_from_f64)
            .or_else(|| prices.average_sell_price.and_then(price_from_f64))?;

        let updated = market.updated_at.clone();
        let observed_at = updated.as_deref().and_then(parse_updated_at);
        let source_event_id = match &updated {
            Some(day) => format!("{}:{}", card.id, day.replace('/', "-")),
            None => card.id.clone(),
        };
        let payload = serde_json::to_value(&card).unwrap_or(serde_json::Value::Null);

        let mut observation = RawObservation::trend(card.name.clone(), price, CURRENCY);
        observation.source_event_id = Some(source_event_id);
        observation.observed_at = observed_at;
        observation.card_number = card.number.clone();
        observation.set_code = card.set.as_ref().map(|s| s.id.clone());
        observation.description = card.set.as_ref().and_then(|s| s.name.clone());
        observation.payload = payload;
        Some(observation)
    }
}

/// Cardmarket reports the refresh day as `YYYY/MM/DD`.
fn parse_updated_at(value: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y/%m/%d").ok()?;
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

#[async_trait]
impl PriceSource for CardmarketSource {
    fn id(&self) -> SourceId {
        SourceId::Cardmarket
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            games: SupportedGames::Only(SUPPORTED_GAMES),
            structured_identifiers: true,
            graded_games: &[],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            max_concurrency: 2,
            min_delay: Duration::from_millis(250),
        }
    }

    async fn fetch_observations(
        &self,
        lookup: &ItemLookup,
    ) -> Result<Vec<RawObservation>, SourceError> {
        let game = lookup.game();
        if !SUPPORTED_GAMES.contains(&game) {
            return Err(SourceError::UnsupportedGame {
                source_id: SOURCE.to_string(),
                game: game.to_string(),
            });
        }

        let query = Self::build_query(lookup)?;
        let url = format!("{}/cards?q={}", self.base_url, encode(&query));
        debug!("Cardmarket lookup for {}: {}", lookup.item_id, query);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(SOURCE, status));
        }

        let body = response.text().await?;
        Self::parse_response(&body)
    }
}
