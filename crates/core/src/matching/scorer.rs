use cardprice_market_data::RawObservation;

use crate::catalog::{normalize_collector_number, normalize_field, MarketItem};

/// Scores how likely an external listing refers to a catalog item.
///
/// Implementations return a value in `[0, 1]`.
pub trait MatchScorer: Send + Sync {
    fn score(&self, external_name: &str, internal_name: &str, exact_number: bool) -> f64;
}

/// Lowercase and keep only alphanumeric characters.
pub fn normalize_name(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Name comparison with a position-sensitive fallback.
///
/// - exact collector number: 1.0
/// - equal normalized names: 0.95
/// - one name contains the other: 0.90
/// - otherwise: characters equal at the same index, over the longer length,
///   rounded to two decimals
///
/// Either normalized side being empty scores 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalScorer;

impl MatchScorer for PositionalScorer {
    fn score(&self, external_name: &str, internal_name: &str, exact_number: bool) -> f64 {
        if exact_number {
            return 1.0;
        }

        let external = normalize_name(external_name);
        let internal = normalize_name(internal_name);
        if external.is_empty() || internal.is_empty() {
            return 0.0;
        }
        if external == internal {
            return 0.95;
        }
        if external.contains(&internal) || internal.contains(&external) {
            return 0.90;
        }

        let a: Vec<char> = external.chars().collect();
        let b: Vec<char> = internal.chars().collect();
        let longer = a.len().max(b.len());
        let same = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
        let ratio = same as f64 / longer as f64;
        (ratio * 100.0).round() / 100.0
    }
}

/// Whether the observation carries the item's collector number.
///
/// Both sides must expose a number that agrees after normalization, and the
/// set codes must agree when both are present.
pub fn exact_number_match(item: &MarketItem, observation: &RawObservation) -> bool {
    let numbers = (
        item.card_number.as_deref().and_then(normalize_collector_number),
        observation
            .card_number
            .as_deref()
            .and_then(normalize_collector_number),
    );
    let (Some(ours), Some(theirs)) = numbers else {
        return false;
    };
    if ours != theirs {
        return false;
    }

    match (
        item.set_code.as_deref().and_then(normalize_field),
        observation.set_code.as_deref().and_then(normalize_field),
    ) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}
