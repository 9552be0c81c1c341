//! Credential-checked construction of price sources.

use std::sync::Arc;

use crate::errors::SourceError;
use crate::models::SourceId;

use super::cardmarket::CardmarketSource;
use super::ebay::EbaySource;
use super::manual::ManualSource;
use super::pricecharting::PriceChartingSource;
use super::traits::PriceSource;

/// Environment keys holding source credentials.
pub const CARDMARKET_API_KEY: &str = "CP_CARDMARKET_API_KEY";
pub const PRICECHARTING_TOKEN: &str = "CP_PRICECHARTING_TOKEN";
pub const EBAY_APP_ID: &str = "CP_EBAY_APP_ID";

/// Credentials and endpoint overrides for the remote sources.
#[derive(Clone, Debug, Default)]
pub struct SourceCredentials {
    pub cardmarket_api_key: Option<String>,
    pub pricecharting_token: Option<String>,
    pub ebay_app_id: Option<String>,
    /// Per-source base URL overrides, mostly for tests and proxies.
    pub cardmarket_base_url: Option<String>,
    pub pricecharting_base_url: Option<String>,
    pub ebay_base_url: Option<String>,
}

impl SourceCredentials {
    /// Read credentials from `CP_*` environment variables.
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            cardmarket_api_key: read(CARDMARKET_API_KEY),
            pricecharting_token: read(PRICECHARTING_TOKEN),
            ebay_app_id: read(EBAY_APP_ID),
            cardmarket_base_url: read("CP_CARDMARKET_BASE_URL"),
            pricecharting_base_url: read("CP_PRICECHARTING_BASE_URL"),
            ebay_base_url: read("CP_EBAY_BASE_URL"),
        }
    }
}

fn require(
    value: &Option<String>,
    source: SourceId,
    key: &str,
) -> Result<String, SourceError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SourceError::MissingCredential {
            source_id: source.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Build the source for `id`, failing if its credential is absent.
///
/// The manual source needs no credential and starts empty.
pub fn build_source(
    id: SourceId,
    credentials: &SourceCredentials,
) -> Result<Arc<dyn PriceSource>, SourceError> {
    let source: Arc<dyn PriceSource> = match id {
        SourceId::Cardmarket => {
            let key = require(&credentials.cardmarket_api_key, id, CARDMARKET_API_KEY)?;
            match &credentials.cardmarket_base_url {
                Some(url) => Arc::new(CardmarketSource::with_base_url(key, url.clone())),
                None => Arc::new(CardmarketSource::new(key)),
            }
        }
        SourceId::PriceCharting => {
            let token = require(&credentials.pricecharting_token, id, PRICECHARTING_TOKEN)?;
            match &credentials.pricecharting_base_url {
                Some(url) => Arc::new(PriceChartingSource::with_base_url(token, url.clone())),
                None => Arc::new(PriceChartingSource::new(token)),
            }
        }
        SourceId::Ebay => {
            let app_id = require(&credentials.ebay_app_id, id, EBAY_APP_ID)?;
            match &credentials.ebay_base_url {
                Some(url) => Arc::new(EbaySource::with_base_url(app_id, url.clone())),
                None => Arc::new(EbaySource::new(app_id)),
            }
        }
        SourceId::Manual => Arc::new(ManualSource::new()),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_the_key() {
        let credentials = SourceCredentials::default();
        match build_source(SourceId::Ebay, &credentials) {
            Err(SourceError::MissingCredential { source_id, key }) => {
                assert_eq!(source_id, "ebay");
                assert_eq!(key, EBAY_APP_ID);
            }
            other => panic!("expected missing credential, got {:?}", other.map(|s| s.id())),
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let credentials = SourceCredentials {
            pricecharting_token: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(build_source(SourceId::PriceCharting, &credentials).is_err());
    }

    #[test]
    fn test_builds_configured_sources() {
        let credentials = SourceCredentials {
            cardmarket_api_key: Some("key".to_string()),
            ..Default::default()
        };
        let source = build_source(SourceId::Cardmarket, &credentials).unwrap();
        assert_eq!(source.id(), SourceId::Cardmarket);

        let manual = build_source(SourceId::Manual, &credentials).unwrap();
        assert_eq!(manual.id(), SourceId::Manual);
    }
}
