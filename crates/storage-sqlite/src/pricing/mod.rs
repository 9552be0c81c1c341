mod model;
mod repository;

pub use model::{MarketItemGradeDB, PriceHistoryDB};
pub use repository::PricingRepository;
