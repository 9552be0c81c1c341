/// Classification of source failures.
///
/// Used to decide how a failed fetch is counted in run statistics.
///
/// | Kind | Aborts run? | Counted as |
/// |------|-------------|------------|
/// | `Configuration` | Yes, before any item | fatal error |
/// | `ExternalFetch` | No | per-source failure |
/// | `Parse` | No | per-source failure |
/// | `NotApplicable` | No | per-source skip |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// A required credential or setting is missing.
    Configuration,

    /// Network failure or non-success response from the source.
    ExternalFetch,

    /// The source answered but the payload had an unexpected shape.
    Parse,

    /// The source cannot serve this item (unsupported game, missing identifiers).
    NotApplicable,
}

impl FailureKind {
    /// Whether this failure should be counted as a failed attempt
    /// rather than a skipped one.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ExternalFetch | Self::Parse | Self::Configuration)
    }
}
