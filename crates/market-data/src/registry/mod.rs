//! Source orchestration.
//!
//! This module provides:
//! - Token bucket rate limiting per source
//! - Source gates combining concurrency, rate and post-call delay limits
//! - The ordered fallback chain filtered by game
//! - Per-item attempt diagnostics

mod chain;
mod gate;
mod rate_limiter;
mod skip_reason;

pub use chain::{SourceChain, DEFAULT_FALLBACK_ORDER};
pub use gate::SourceGate;
pub use rate_limiter::RateLimiter;
pub use skip_reason::{FetchDiagnostics, SkipReason, SourceAttempt};
