//! Ordered source fallback chain.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::errors::SourceError;
use crate::models::{Game, SourceId};
use crate::provider::{build_source, SourceCredentials};

use super::gate::SourceGate;

/// Fallback order used when none is configured.
pub const DEFAULT_FALLBACK_ORDER: [SourceId; 3] =
    [SourceId::Cardmarket, SourceId::PriceCharting, SourceId::Ebay];

/// Gated sources in the order they are tried for an item.
///
/// `delay` is the run's post-call pause override, applied per fetch so the
/// gates themselves can be shared with other runs.
pub struct SourceChain {
    gates: Vec<Arc<SourceGate>>,
    delay: Option<Duration>,
}

impl SourceChain {
    /// Build every source in `order` behind fresh gates, failing on the first
    /// missing credential.
    pub fn build(
        order: &[SourceId],
        credentials: &SourceCredentials,
        delay: Option<Duration>,
    ) -> Result<Self, SourceError> {
        let mut gates = Vec::with_capacity(order.len());
        for id in order {
            gates.push(Arc::new(SourceGate::new(build_source(*id, credentials)?)));
        }
        info!(
            "Source chain: {}",
            order
                .iter()
                .map(SourceId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(Self::from_gates(gates, delay))
    }

    /// Chain over existing gates, keeping their order.
    pub fn from_gates(gates: Vec<Arc<SourceGate>>, delay: Option<Duration>) -> Self {
        Self { gates, delay }
    }

    /// Post-call pause override for this run, if any.
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Sources that can price `game`, in fallback order.
    pub fn for_game(&self, game: Game) -> Vec<Arc<SourceGate>> {
        self.gates
            .iter()
            .filter(|gate| gate.capabilities().games.contains(game))
            .cloned()
            .collect()
    }

    pub fn gate(&self, id: SourceId) -> Option<Arc<SourceGate>> {
        self.gates.iter().find(|gate| gate.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.gates.iter().map(|gate| gate.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
