//! Price events: stored observations, outlier flags and aggregation.

mod aggregate;
mod model;
mod outlier;
mod store;

pub use aggregate::{aggregate_prices, round_money, PriceAggregate};
pub use model::{generate_event_id, PriceEvent};
pub use outlier::OutlierDetector;
pub use store::PriceEventRepositoryTrait;
