//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`SourceError`]: The main error enum for all price source operations
//! - [`FailureKind`]: Classification used by run-level counters and logging

mod kind;

pub use kind::FailureKind;

use thiserror::Error;

/// Errors that can occur while fetching observations from a price source.
///
/// Each variant is classified into a [`FailureKind`] via the
/// [`failure_kind`](Self::failure_kind) method. None of these errors abort a
/// run: callers skip the item/source pair and move on.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A credential required by the source is not configured.
    #[error("Missing credential for {source_id}: {key}")]
    MissingCredential {
        /// The source that needs the credential
        source_id: String,
        /// Name of the configuration key
        key: String,
    },

    /// The source does not cover this item's game.
    #[error("Unsupported game for {source_id}: {game}")]
    UnsupportedGame { source_id: String, game: String },

    /// The item lacks the identifiers this source needs to build a query.
    #[error("Insufficient identifiers for {source_id}: {message}")]
    InsufficientIdentifiers { source_id: String, message: String },

    /// The source rate limited the request (HTTP 429).
    #[error("Rate limited: {source_id}")]
    RateLimited { source_id: String },

    /// The request to the source timed out.
    #[error("Timeout: {source_id}")]
    Timeout { source_id: String },

    /// The source answered with a non-success status.
    #[error("HTTP {status} from {source_id}")]
    Http { source_id: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("Parse error from {source_id}: {message}")]
    Parse { source_id: String, message: String },

    /// A network error occurred while communicating with a source.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SourceError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardprice_market_data::errors::{FailureKind, SourceError};
    ///
    /// let error = SourceError::Http { source_id: "ebay".to_string(), status: 503 };
    /// assert_eq!(error.failure_kind(), FailureKind::ExternalFetch);
    ///
    /// let error = SourceError::Parse {
    ///     source_id: "ebay".to_string(),
    ///     message: "missing searchResult".to_string(),
    /// };
    /// assert_eq!(error.failure_kind(), FailureKind::Parse);
    /// ```
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::MissingCredential { .. } => FailureKind::Configuration,

            Self::UnsupportedGame { .. } | Self::InsufficientIdentifiers { .. } => {
                FailureKind::NotApplicable
            }

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::Http { .. }
            | Self::Network(_) => FailureKind::ExternalFetch,

            Self::Parse { .. } => FailureKind::Parse,
        }
    }

    /// Build a parse error for the given source.
    pub fn parse(source_id: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status to the matching error variant.
    pub fn from_status(source_id: &str, status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            429 => Self::RateLimited {
                source_id: source_id.to_string(),
            },
            408 | 504 => Self::Timeout {
                source_id: source_id.to_string(),
            },
            code => Self::Http {
                source_id: source_id.to_string(),
                status: code,
            },
        }
    }
}
