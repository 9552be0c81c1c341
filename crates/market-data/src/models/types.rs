use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of an external price source.
///
/// The string forms are the ones used in trigger payloads and persisted rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Structured per-game card marketplace API (trend / average sell price).
    Cardmarket,
    /// General cross-category price lookup with graded tiers.
    #[serde(rename = "pricecharting")]
    PriceCharting,
    /// Auction-result search (individual sold listings).
    Ebay,
    /// Observations supplied inline by an operator.
    Manual,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::Cardmarket,
        SourceId::PriceCharting,
        SourceId::Ebay,
        SourceId::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Cardmarket => "cardmarket",
            SourceId::PriceCharting => "pricecharting",
            SourceId::Ebay => "ebay",
            SourceId::Manual => "manual",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown price source '{}'", self.0)
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cardmarket" => Ok(SourceId::Cardmarket),
            "pricecharting" => Ok(SourceId::PriceCharting),
            "ebay" => Ok(SourceId::Ebay),
            "manual" => Ok(SourceId::Manual),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}
