//! Match confidence between external listings and catalog items.

mod scorer;

pub use scorer::{exact_number_match, normalize_name, MatchScorer, PositionalScorer};
