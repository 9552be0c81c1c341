//! Per-item source attempt tracking.

use crate::models::SourceId;

/// Why a source did not produce a usable price for an item.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The source does not cover the item's game.
    UnsupportedGame,

    /// The item lacks identifiers the source needs.
    InsufficientIdentifiers,

    /// The source answered but nothing survived matching and outlier checks.
    NoUsablePrice,

    /// The run deadline passed before the source was tried.
    DeadlineExceeded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::UnsupportedGame => "unsupported game",
            SkipReason::InsufficientIdentifiers => "insufficient identifiers",
            SkipReason::NoUsablePrice => "no usable price",
            SkipReason::DeadlineExceeded => "deadline exceeded",
        }
    }
}

/// Record of a single source attempt for an item.
#[derive(Clone, Debug)]
pub struct SourceAttempt {
    pub source: SourceId,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub success: bool,
}

/// Attempts made for one item, in order.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<SourceAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, source: SourceId, reason: SkipReason) {
        self.attempts.push(SourceAttempt {
            source,
            skipped: Some(reason),
            error: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, source: SourceId, error: String) {
        self.attempts.push(SourceAttempt {
            source,
            skipped: None,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, source: SourceId) {
        self.attempts.push(SourceAttempt {
            source,
            skipped: None,
            error: None,
            success: true,
        });
    }

    /// Summary for logging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.source)
                } else if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({})", a.source, skip.as_str())
                } else if let Some(err) = &a.error {
                    format!("{}: ERROR ({})", a.source, err)
                } else {
                    format!("{}: UNKNOWN", a.source)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// True when at least one source was tried and every one of them errored.
    pub fn all_errored(&self) -> bool {
        !self.attempts.is_empty() && self.attempts.iter().all(|a| a.error.is_some())
    }

    pub fn errors(&self) -> Vec<(SourceId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (a.source, e.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip(SourceId::Cardmarket, SkipReason::NoUsablePrice);
        diag.record_error(SourceId::PriceCharting, "Timeout".to_string());
        diag.record_success(SourceId::Ebay);

        let summary = diag.summary();
        assert_eq!(
            summary,
            "cardmarket: SKIPPED (no usable price) -> pricecharting: ERROR (Timeout) -> ebay: SUCCESS"
        );
        assert!(diag.has_success());
        assert!(!diag.all_errored());
    }

    #[test]
    fn test_all_errored() {
        let mut diag = FetchDiagnostics::new();
        assert!(!diag.all_errored());

        diag.record_error(SourceId::PriceCharting, "HTTP 503".to_string());
        diag.record_error(SourceId::Ebay, "Timeout".to_string());
        assert!(diag.all_errored());
        assert_eq!(diag.errors().len(), 2);

        diag.record_skip(SourceId::Ebay, SkipReason::NoUsablePrice);
        assert!(!diag.all_errored());
    }
}
