//! SQLite storage implementation for catalog items.

mod model;
mod repository;

pub use model::MarketItemDB;
pub use repository::CatalogRepository;
