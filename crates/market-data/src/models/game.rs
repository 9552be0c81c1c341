use std::fmt;

use serde::{Deserialize, Serialize};

/// Trading card game a catalog item belongs to.
///
/// Derived from the free-form catalog category. Categories that are not one
/// of the known games map to [`Game::Other`]; the original category string is
/// kept on the item itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    Pokemon,
    Yugioh,
    Mtg,
    OnePiece,
    Lorcana,
    Sports,
    Other,
}

impl Game {
    /// Classify a catalog category.
    pub fn from_category(category: &str) -> Self {
        let normalized: String = category
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "pokemon" | "pokemontcg" => Game::Pokemon,
            "yugioh" | "ygo" => Game::Yugioh,
            "mtg" | "magic" | "magicthegathering" => Game::Mtg,
            "onepiece" | "onepiecetcg" => Game::OnePiece,
            "lorcana" | "disneylorcana" => Game::Lorcana,
            "sports" | "sportscards" | "baseball" | "basketball" | "football" | "soccer"
            | "hockey" => Game::Sports,
            _ => Game::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Pokemon => "pokemon",
            Game::Yugioh => "yugioh",
            Game::Mtg => "mtg",
            Game::OnePiece => "one_piece",
            Game::Lorcana => "lorcana",
            Game::Sports => "sports",
            Game::Other => "other",
        }
    }

    /// Whether the game is a collectible card game with professional grading tiers
    /// tracked per item.
    pub fn tracks_grades(&self) -> bool {
        matches!(
            self,
            Game::Pokemon | Game::Yugioh | Game::Mtg | Game::OnePiece | Game::Lorcana
        )
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
