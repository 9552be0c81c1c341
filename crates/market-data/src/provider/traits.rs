//! Price source trait definitions.
//!
//! This module defines the core `PriceSource` trait that all
//! external price sources must implement.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::{ItemLookup, RawObservation, SourceId};

use super::capabilities::{RateLimit, SourceCapabilities};

/// Trait for external price sources.
///
/// Implement this trait to add support for a new price source.
/// The fallback chain uses the source's capabilities to decide when to call
/// it, and the source gate uses its rate limit to decide how often.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use cardprice_market_data::provider::{PriceSource, RateLimit, SourceCapabilities, SupportedGames};
///
/// struct MySource {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl PriceSource for MySource {
///     fn id(&self) -> SourceId {
///         SourceId::Ebay
///     }
///
///     fn capabilities(&self) -> SourceCapabilities {
///         SourceCapabilities {
///             games: SupportedGames::All,
///             structured_identifiers: false,
///             graded_games: &[],
///         }
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     // ... implement fetch_observations
/// }
/// ```
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Identifier for this source.
    ///
    /// Used for persisted rows, logging and per-source run counters.
    fn id(&self) -> SourceId;

    /// Describes which games this source can price.
    fn capabilities(&self) -> SourceCapabilities;

    /// Rate limiting configuration applied by the source gate.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch raw observations for a catalog item.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Identity of the catalog item being priced
    ///
    /// # Returns
    ///
    /// Zero or more observations. An empty vector means the source had no
    /// data for the item; it is not an error.
    async fn fetch_observations(
        &self,
        lookup: &ItemLookup,
    ) -> Result<Vec<RawObservation>, SourceError>;
}
