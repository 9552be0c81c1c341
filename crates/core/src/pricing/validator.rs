use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::model::{PriceCandidate, PriceDecision, PriceUpdate, PriceWrite, ValidationOutcome};
use super::store::PricingRepositoryTrait;
use crate::catalog::MarketItem;
use crate::config::PriceBounds;
use crate::errors::Result;
use crate::price_events::round_money;

/// Compare-and-set attempts before a candidate is given up on.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Guards catalog prices against implausible jumps.
///
/// A candidate is accepted when the item has no price yet, or when it lies
/// within `[current * min_ratio, current * max_ratio]`, bounds inclusive.
/// The stored price is only overwritten if it still equals the price the
/// bounds were checked against; otherwise the check is repeated against the
/// stored price.
pub struct PriceValidator {
    bounds: PriceBounds,
    repository: Arc<dyn PricingRepositoryTrait>,
}

impl PriceValidator {
    pub fn new(bounds: PriceBounds, repository: Arc<dyn PricingRepositoryTrait>) -> Self {
        Self { bounds, repository }
    }

    /// Decide against the item's price without touching storage.
    pub fn evaluate(
        &self,
        item: &MarketItem,
        candidate: &PriceCandidate,
        now: DateTime<Utc>,
    ) -> PriceDecision {
        self.decide(&item.id, item.current_price, candidate, now)
    }

    fn decide(
        &self,
        item_id: &str,
        current_price: Option<Decimal>,
        candidate: &PriceCandidate,
        now: DateTime<Utc>,
    ) -> PriceDecision {
        if candidate.price <= Decimal::ZERO {
            return PriceDecision::Reject {
                reason: format!("non-positive price {}", candidate.price),
            };
        }

        // A zero or negative stored price is treated as unpriced.
        let previous = current_price.filter(|p| *p > Decimal::ZERO);

        if let Some(current) = previous {
            let low = current * self.bounds.min_ratio;
            let high = current * self.bounds.max_ratio;
            if candidate.price < low || candidate.price > high {
                return PriceDecision::Reject {
                    reason: format!(
                        "suspicious price {} outside [{}, {}] for current {}",
                        candidate.price,
                        low.normalize(),
                        high.normalize(),
                        current
                    ),
                };
            }
        }

        let percent_change = previous
            .map(|current| round_money((candidate.price - current) / current * Decimal::ONE_HUNDRED));

        PriceDecision::Accept(PriceUpdate {
            market_item_id: item_id.to_string(),
            source: candidate.source.to_string(),
            previous_price: previous,
            new_price: candidate.price,
            percent_change,
            currency: candidate.currency.clone(),
            grades: candidate.grades.clone(),
            updated_at: now,
        })
    }

    /// Evaluate and, when accepted, persist the update.
    ///
    /// `item` may be stale: a price written since it was loaded is picked up
    /// from storage and the bounds are checked again before anything is
    /// written.
    pub async fn validate(
        &self,
        item: &MarketItem,
        candidate: &PriceCandidate,
    ) -> Result<ValidationOutcome> {
        let mut current = item.current_price;
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let update = match self.decide(&item.id, current, candidate, Utc::now()) {
                PriceDecision::Accept(update) => update,
                PriceDecision::Reject { reason } => {
                    warn!("Rejected {} price for {}: {}", candidate.source, item.id, reason);
                    return Ok(ValidationOutcome::Rejected { reason });
                }
            };
            match self.repository.apply_price_update(&update).await? {
                PriceWrite::Applied(entry) => {
                    info!(
                        "Price for {} set to {} {} from {} (was {:?})",
                        item.id,
                        update.new_price,
                        update.currency,
                        update.source,
                        update.previous_price
                    );
                    return Ok(ValidationOutcome::Updated(entry));
                }
                PriceWrite::Stale { current: stored } => {
                    debug!(
                        "Price for {} moved from {:?} to {:?}; re-checking",
                        item.id, update.previous_price, stored
                    );
                    current = stored;
                }
            }
        }

        let reason = format!(
            "price kept changing during validation ({} attempts)",
            MAX_WRITE_ATTEMPTS
        );
        warn!("Rejected {} price for {}: {}", candidate.source, item.id, reason);
        Ok(ValidationOutcome::Rejected { reason })
    }
}
