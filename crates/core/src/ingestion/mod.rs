//! Price event ingestion.
//!
//! - [`model`] - Trigger payloads and per-item / per-run results
//! - [`service`] - The ingestor routing observations to review or validation

pub mod model;
pub mod service;


pub use model::{IngestionRequest, IngestionResult, ItemIngestion, ItemOutcome, ManualObservation};
pub use service::PriceEventIngestor;
