//! Card Price Core - Domain entities, services, and traits.
//!
//! This crate contains the price reconciliation logic: canonical item keys,
//! match scoring, outlier flags, price validation, the review queue, event
//! ingestion and scheduled refresh. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod matching;
pub mod price_events;
pub mod pricing;
pub mod review;
pub mod scheduler;
pub mod sources;

#[cfg(test)]
pub(crate) mod testing;

pub use config::EngineConfig;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
