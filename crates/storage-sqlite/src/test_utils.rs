//! Temp-file databases for repository tests.

use std::sync::Arc;

use cardprice_core::catalog::MarketItem;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};

/// Migrated database in a temp directory. Keep the `TempDir` alive for the
/// duration of the test.
pub fn test_db() -> (Arc<DbPool>, WriteHandle, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    let pool = create_pool(&db_path_str).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    (pool, writer, temp_dir)
}

pub fn item(id: &str, category: &str) -> MarketItem {
    MarketItem::new(id, format!("Card {}", id), category)
}

pub fn priced_item(id: &str, price: Decimal, updated_at: Option<DateTime<Utc>>) -> MarketItem {
    let mut item = item(id, "pokemon");
    item.current_price = Some(price);
    item.price_updated_at = updated_at;
    item
}
