//! Source construction seam between the engine and the market-data crate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cardprice_market_data::errors::SourceError;
use cardprice_market_data::{build_source, SourceChain, SourceCredentials, SourceGate, SourceId};
use log::debug;

/// Resolves a source id to its gate.
///
/// A provider hands out the same gate for an id on every call, so ingestion
/// triggers and scheduler runs that overlap share one set of per-source
/// limits. Fails with [`SourceError::MissingCredential`] when the source
/// cannot be configured.
pub trait SourceProvider: Send + Sync {
    fn gate(&self, id: SourceId) -> Result<Arc<SourceGate>, SourceError>;

    /// Chain over the gates in `order`; fails on the first unconfigured source.
    fn chain(
        &self,
        order: &[SourceId],
        delay: Option<Duration>,
    ) -> Result<SourceChain, SourceError> {
        let gates = order
            .iter()
            .map(|id| self.gate(*id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SourceChain::from_gates(gates, delay))
    }
}

/// HTTP sources built once from credentials.
pub struct ConfiguredSources {
    credentials: SourceCredentials,
    gates: HashMap<SourceId, Arc<SourceGate>>,
}

impl ConfiguredSources {
    pub fn new(credentials: SourceCredentials) -> Self {
        let mut gates = HashMap::new();
        for id in SourceId::ALL {
            if id == SourceId::Manual {
                continue;
            }
            match build_source(id, &credentials) {
                Ok(source) => {
                    gates.insert(id, Arc::new(SourceGate::new(source)));
                }
                Err(e) => debug!("{} not configured: {}", id, e),
            }
        }
        Self { credentials, gates }
    }
}

impl SourceProvider for ConfiguredSources {
    fn gate(&self, id: SourceId) -> Result<Arc<SourceGate>, SourceError> {
        if let Some(gate) = self.gates.get(&id) {
            return Ok(gate.clone());
        }
        // Surfaces the missing credential for unconfigured sources.
        build_source(id, &self.credentials).map(|source| Arc::new(SourceGate::new(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_fails_on_missing_credential() {
        let sources = ConfiguredSources::new(SourceCredentials {
            cardmarket_api_key: Some("key".to_string()),
            ..Default::default()
        });
        let result = sources.chain(&[SourceId::Cardmarket, SourceId::PriceCharting], None);
        assert!(matches!(
            result,
            Err(SourceError::MissingCredential { ref key, .. }) if key == "CP_PRICECHARTING_TOKEN"
        ));
        assert!(sources.chain(&[SourceId::Cardmarket], None).is_ok());
    }

    #[test]
    fn test_gates_are_shared_between_runs() {
        let sources = ConfiguredSources::new(SourceCredentials {
            cardmarket_api_key: Some("key".to_string()),
            ebay_app_id: Some("app".to_string()),
            ..Default::default()
        });

        let first = sources.gate(SourceId::Ebay).unwrap();
        let second = sources.gate(SourceId::Ebay).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let fast = sources
            .chain(&[SourceId::Cardmarket, SourceId::Ebay], Some(Duration::ZERO))
            .unwrap();
        let slow = sources.chain(&[SourceId::Ebay], None).unwrap();
        assert!(Arc::ptr_eq(&fast.gate(SourceId::Ebay).unwrap(), &first));
        assert!(Arc::ptr_eq(&slow.gate(SourceId::Ebay).unwrap(), &first));
        assert_eq!(fast.delay(), Some(Duration::ZERO));
    }
}
