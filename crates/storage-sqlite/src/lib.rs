//! SQLite storage implementation for the card price engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `cardprice-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for catalog items, price events, history,
//!   the review queue, the scheduler audit log and run leases
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `cardprice-core` is database-agnostic and works with traits.
//!
//! ```text
//!      core (domain)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```
//!
//! Reads use pooled connections. Every write goes through a single writer
//! actor ([`WriteHandle`]) and runs in its own immediate transaction.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod audit;
pub mod catalog;
pub mod leases;
pub mod price_events;
pub mod pricing;
pub mod review;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use audit::AuditLogRepository;
pub use catalog::CatalogRepository;
pub use leases::RunLeaseRepository;
pub use price_events::PriceEventRepository;
pub use pricing::PricingRepository;
pub use review::ReviewRepository;

// Re-export from cardprice-core for convenience
pub use cardprice_core::errors::{DatabaseError, Error, Result};
