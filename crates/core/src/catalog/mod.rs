//! Catalog module.
//!
//! - [`model`] - Catalog items, grade snapshots and selection filters
//! - [`canonical_key`] - Deterministic identity keys per game
//! - [`store`] - Storage trait implemented by the persistence layer

pub mod canonical_key;
pub mod model;
pub mod store;

pub use canonical_key::{canonical_key, normalize_collector_number, normalize_field, KeyFields};
pub use model::{ItemFilter, MarketItem, MarketItemGrade, RefreshFilter};
pub use store::CatalogRepositoryTrait;
