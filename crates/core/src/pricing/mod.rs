//! Price validation and verified price persistence.

mod model;
mod store;
mod validator;

pub use model::{
    PriceCandidate, PriceDecision, PriceHistoryEntry, PriceUpdate, PriceWrite, ValidationOutcome,
};
pub use store::PricingRepositoryTrait;
pub use validator::PriceValidator;
