//! Price source abstractions and implementations.
//!
//! This module contains:
//! - The `PriceSource` trait that all sources implement
//! - Source capabilities and rate limiting configuration
//! - Concrete source implementations (cardmarket, pricecharting, ebay, manual)
//! - Credential-checked construction of sources from settings
//!
//! # Source Roles
//!
//! Sources are tried by the scheduler in a fixed fallback order:
//! a structured per-game API first, then a general cross-category lookup,
//! then an auction-result search for whatever remains.

mod capabilities;
mod settings;
mod traits;

pub mod cardmarket;
pub mod ebay;
pub mod manual;
pub mod pricecharting;

// Re-exports
pub use capabilities::{RateLimit, SourceCapabilities, SupportedGames};
pub use settings::{build_source, SourceCredentials};
pub use traits::PriceSource;

use rust_decimal::Decimal;

/// Convert a floating point price from a JSON payload into a two-decimal price.
///
/// Returns `None` for non-finite, zero or negative values.
pub(crate) fn price_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_f64_retain(value).map(|d| d.round_dp(2))
}

/// Convert an integer amount of cents into a price.
pub(crate) fn price_from_cents(cents: i64) -> Option<Decimal> {
    if cents <= 0 {
        return None;
    }
    Some(Decimal::new(cents, 2))
}
