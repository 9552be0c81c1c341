//! Card Price Market Data Crate
//!
//! This crate fetches raw price observations for catalog items from
//! external sources.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple sources: Cardmarket, PriceCharting, eBay sold listings, manual entry
//! - Game-aware source selection with an ordered fallback chain
//! - Per-source concurrency limits, rate limiting and call spacing
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   ItemLookup     |  (catalog identity)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   SourceChain    |  (fallback order, filtered by game)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   SourceGate     |  (semaphore + token bucket + delay)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   PriceSource    |  (Cardmarket, PriceCharting, eBay, Manual)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  RawObservation  |  (unmatched price signal)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`ItemLookup`] - Catalog identity handed to sources
//! - [`RawObservation`] - One price signal before matching
//! - [`SourceId`] - Source identifier
//! - [`Game`] - Trading card game classification

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use models::{
    EventType, Game, Grade, GradedPrice, ItemLookup, RawObservation, SourceId, UnknownSource,
};

pub use provider::cardmarket::CardmarketSource;
pub use provider::ebay::EbaySource;
pub use provider::manual::ManualSource;
pub use provider::pricecharting::PriceChartingSource;
pub use provider::{
    build_source, PriceSource, RateLimit, SourceCapabilities, SourceCredentials, SupportedGames,
};

pub use registry::{
    FetchDiagnostics, RateLimiter, SkipReason, SourceAttempt, SourceChain, SourceGate,
    DEFAULT_FALLBACK_ORDER,
};
