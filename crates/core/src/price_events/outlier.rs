//! Blocklist-based outlier detection.

use regex::Regex;

use crate::errors::{Error, Result};

/// Flags listings whose title or description contains a blocklisted term.
///
/// Terms match case-insensitively on word boundaries; a multi-word term
/// matches across any run of whitespace.
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    pattern: Option<Regex>,
}

impl OutlierDetector {
    pub fn new(terms: &[String]) -> Result<Self> {
        let mut terms: Vec<String> = terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Ok(Self { pattern: None });
        }
        // Longest first so "lots" wins over "lot".
        terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
        terms.dedup();

        let alternation = terms
            .iter()
            .map(|t| {
                t.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
            .map_err(|e| Error::InvalidConfigValue(format!("outlier blocklist: {}", e)))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Reason string when the listing is an outlier.
    pub fn check(&self, title: &str, description: Option<&str>) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        std::iter::once(title)
            .chain(description)
            .find_map(|text| pattern.find(text))
            .map(|m| {
                let term = m
                    .as_str()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                format!("matched blocklist term '{}'", term)
            })
    }
}
