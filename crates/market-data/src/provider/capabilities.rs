//! Source capabilities and rate limiting configuration.
//!
//! This module defines structures for describing what a price source
//! can serve and how it should be rate-limited.

use std::time::Duration;

use crate::models::Game;

/// Which games a source can price.
#[derive(Clone, Debug)]
pub enum SupportedGames {
    /// Every category, including ones outside the known games.
    All,
    /// Only the listed games.
    Only(&'static [Game]),
}

impl SupportedGames {
    pub fn contains(&self, game: Game) -> bool {
        match self {
            SupportedGames::All => true,
            SupportedGames::Only(games) => games.contains(&game),
        }
    }
}

/// Describes the capabilities of a price source.
///
/// Used by the fallback chain to decide which sources to try for an item.
#[derive(Clone, Debug)]
pub struct SourceCapabilities {
    /// Games this source can price.
    pub games: SupportedGames,

    /// Whether observations carry structured identifiers (set code, collector number).
    pub structured_identifiers: bool,

    /// Games for which graded tiers are returned alongside the raw price.
    pub graded_games: &'static [Game],
}

/// Rate limiting configuration for a source.
///
/// Controls how aggressively we can call a source to stay within
/// its documented limits.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Maximum concurrent requests to this source.
    pub max_concurrency: usize,

    /// Fixed pause held after each call before the slot is released.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            max_concurrency: 1,
            min_delay: Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_games() {
        let only = SupportedGames::Only(&[Game::Pokemon]);
        assert!(only.contains(Game::Pokemon));
        assert!(!only.contains(Game::Mtg));
        assert!(SupportedGames::All.contains(Game::Other));
    }
}
