mod model;
mod repository;

pub use model::MatchReviewDB;
pub use repository::ReviewRepository;
