//! eBay completed-listings price source.
//!
//! Uses the Finding API `findCompletedItems` operation restricted to sold
//! items. Every sold listing becomes one sale observation keyed by its eBay
//! item id. The JSON flavour of the Finding API wraps every value in a
//! single-element array, so most fields below are `Vec<T>`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::SourceError;
use crate::models::{ItemLookup, RawObservation, SourceId};
use crate::provider::{price_from_f64, PriceSource, RateLimit, SourceCapabilities, SupportedGames};

const DEFAULT_BASE_URL: &str = "https://svcs.ebay.com/services/search/FindingService/v1";
const SOURCE: &str = "ebay";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ENTRIES_PER_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindingEnvelope {
    #[serde(default)]
    find_completed_items_response: Vec<FindingResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindingResponse {
    #[serde(default)]
    ack: Vec<String>,
    #[serde(default)]
    error_message: Vec<serde_json::Value>,
    #[serde(default)]
    search_result: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    item: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingItem {
    #[serde(default)]
    item_id: Vec<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    subtitle: Vec<String>,
    #[serde(default)]
    selling_status: Vec<SellingStatus>,
    #[serde(default)]
    listing_info: Vec<ListingInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SellingStatus {
    #[serde(default)]
    current_price: Vec<Amount>,
    #[serde(default)]
    selling_state: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Amount {
    #[serde(rename = "@currencyId", default)]
    currency_id: Option<String>,
    #[serde(rename = "__value__")]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingInfo {
    #[serde(default)]
    end_time: Vec<String>,
}

/// eBay sold-listings price source.
pub struct EbaySource {
    client: Client,
    app_id: String,
    base_url: String,
}

impl EbaySource {
    pub fn new(app_id: String) -> Self {
        Self::with_base_url(app_id, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(app_id: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            app_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_response(body: &str) -> Result<Vec<RawObservation>, SourceError> {
        let envelope: FindingEnvelope =
            serde_json::from_str(body).map_err(|e| SourceError::parse(SOURCE, e.to_string()))?;

        let response = envelope
            .find_completed_items_response
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::parse(SOURCE, "missing findCompletedItemsResponse"))?;

        let ack = response.ack.first().map(String::as_str).unwrap_or("");
        if ack != "Success" && ack != "Warning" {
            let detail = response
                .error_message
                .first()
                .map(|v| v.to_string())
                .unwrap_or_else(|| format!("ack {}", ack));
            return Err(SourceError::parse(SOURCE, detail));
        }

        let items = response
            .search_result
            .into_iter()
            .next()
            .map(|r| r.item)
            .unwrap_or_default();

        let mut observations = Vec::with_capacity(items.len());
        for raw in items {
            let listing: ListingItem = match serde_json::from_value(raw.clone()) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("Skipping malformed eBay listing: {}", e);
                    continue;
                }
            };
            if let Some(observation) = listing_to_observation(listing, raw) {
                observations.push(observation);
            }
        }

        Ok(observations)
    }
}

/// Only listings that ended with a sale produce an observation.
fn listing_to_observation(
    listing: ListingItem,
    payload: serde_json::Value,
) -> Option<RawObservation> {
    let status = listing.selling_status.into_iter().next()?;
    if status.selling_state.first().map(String::as_str) != Some("EndedWithSales") {
        return None;
    }
    let amount = status.current_price.into_iter().next()?;
    let price = amount.value.trim().parse::<f64>().ok().and_then(price_from_f64)?;
    let currency = amount.currency_id.unwrap_or_else(|| "USD".to_string());

    let title = listing.title.into_iter().next().unwrap_or_default();
    let mut observation = RawObservation::sale(title, price, currency);
    observation.source_event_id = listing.item_id.into_iter().next();
    observation.description = listing.subtitle.into_iter().next();
    observation.observed_at = listing
        .listing_info
        .into_iter()
        .next()
        .and_then(|info| info.end_time.into_iter().next())
        .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
        .map(|t| t.with_timezone(&Utc));
    observation.payload = payload;
    Some(observation)
}

#[async_trait]
impl PriceSource for EbaySource {
    fn id(&self) -> SourceId {
        SourceId::Ebay
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            games: SupportedGames::All,
            structured_identifiers: false,
            graded_games: &[],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            max_concurrency: 1,
            min_delay: Duration::from_millis(300),
        }
    }

    async fn fetch_observations(
        &self,
        lookup: &ItemLookup,
    ) -> Result<Vec<RawObservation>, SourceError> {
        let keywords = lookup.search_query();
        if keywords.is_empty() {
            return Err(SourceError::InsufficientIdentifiers {
                source_id: SOURCE.to_string(),
                message: "item has no name".to_string(),
            });
        }
        debug!("eBay sold search for {}: {}", lookup.item_id, keywords);

        let entries = ENTRIES_PER_PAGE.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("OPERATION-NAME", "findCompletedItems"),
                ("SERVICE-VERSION", "1.13.0"),
                ("SECURITY-APPNAME", self.app_id.as_str()),
                ("RESPONSE-DATA-FORMAT", "JSON"),
                ("keywords", keywords.as_str()),
                ("itemFilter(0).name", "SoldItemsOnly"),
                ("itemFilter(0).value", "true"),
                ("paginationInput.entriesPerPage", entries.as_str()),
            ])
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use rust_decimal_macros::dec;

    const SOLD: &str = r#"{
        "findCompletedItemsResponse": [{
            "ack": ["Success"],
            "searchResult": [{
                "@count": "3",
                "item": [
                    {
                        "itemId": ["e1"],
                        "title": ["Charizard 4/102 Base Set Holo"],
                        "subtitle": ["Near mint"],
                        "sellingStatus": [{
                            "currentPrice": [{ "@currencyId": "USD", "__value__": "50.0" }],
                            "sellingState": ["EndedWithSales"]
                        }],
                        "listingInfo": [{ "endTime": ["2024-03-01T12:30:00.000Z"] }]
                    },
                    {
                        "itemId": ["e2"],
                        "title": ["Charizard 4/102 unsold"],
                        "sellingStatus": [{
                            "currentPrice": [{ "@currencyId": "USD", "__value__": "999.0" }],
                            "sellingState": ["EndedWithoutSales"]
                        }]
                    },
                    {
                        "itemId": ["e3"],
                        "title": ["Charizard proxy"],
                        "sellingStatus": [{
                            "currentPrice": [{ "@currencyId": "USD", "__value__": "5.25" }],
                            "sellingState": ["EndedWithSales"]
                        }]
                    }
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_parse_keeps_only_sold_listings() {
        let observations = EbaySource::parse_response(SOLD).unwrap();
        assert_eq!(observations.len(), 2);

        let first = &observations[0];
        assert_eq!(first.event_type, EventType::Sale);
        assert_eq!(first.source_event_id.as_deref(), Some("e1"));
        assert_eq!(first.price, dec!(50));
        assert_eq!(first.currency, "USD");
        assert_eq!(first.description.as_deref(), Some("Near mint"));
        assert!(first.observed_at.is_some());
        assert!(!first.has_structured_identifiers());

        assert_eq!(observations[1].source_event_id.as_deref(), Some("e3"));
        assert_eq!(observations[1].price, dec!(5.25));
    }

    #[test]
    fn test_parse_failure_ack() {
        let body = r#"{
            "findCompletedItemsResponse": [{
                "ack": ["Failure"],
                "errorMessage": [{ "error": [{ "message": ["Invalid application"] }] }]
            }]
        }"#;
        let result = EbaySource::parse_response(body);
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }

    #[test]
    fn test_parse_empty_search_result() {
        let body = r#"{
            "findCompletedItemsResponse": [{
                "ack": ["Success"],
                "searchResult": [{ "@count": "0" }]
            }]
        }"#;
        assert!(EbaySource::parse_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_envelope() {
        let result = EbaySource::parse_response("{}");
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }
}
