mod model;
mod repository;

pub use model::PriceEventDB;
pub use repository::PriceEventRepository;
