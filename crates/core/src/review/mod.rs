//! Manual review queue for medium-confidence matches.

mod model;
mod service;
mod store;

pub use model::{MatchReviewEntry, ReviewStatus};
pub use service::{review_reason, ReviewQueueManager};
pub use store::ReviewRepositoryTrait;
