//! Canonical identity keys for catalog items.
//!
//! A canonical key is a deterministic string derived from an item's
//! game-specific identifying fields:
//!
//! | Game      | Required          | Key                                         |
//! |-----------|-------------------|---------------------------------------------|
//! | yugioh    | card code         | `yugioh:<code>`                             |
//! | pokemon   | set, number       | `pokemon:<set>:<number>[:<lang>]` (lang ≠ en) |
//! | lorcana   | set, number       | `lorcana:<set>:<number>`                    |
//! | mtg       | set, number       | `mtg:<set>:<number>[:<variant>]`            |
//! | one_piece | card code         | `one_piece:<code>[:<variant>]`              |
//! | other     | set, number       | `<category>:<set>:<number>`                 |

use cardprice_market_data::Game;

/// Identifying fields consumed by [`canonical_key`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyFields<'a> {
    pub category: &'a str,
    pub set_code: Option<&'a str>,
    pub card_number: Option<&'a str>,
    pub card_code: Option<&'a str>,
    pub variant: Option<&'a str>,
    pub language: Option<&'a str>,
}

/// Trim, lowercase and collapse internal whitespace runs to `-`.
///
/// Returns `None` for blank input.
pub fn normalize_field(value: &str) -> Option<String> {
    let joined = value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Normalize a collector number: drop a `/total` suffix and leading zeros.
///
/// `"004/102"` becomes `"4"`, `"000"` becomes `"0"`, `"TG05"` becomes `"tg05"`.
pub fn normalize_collector_number(value: &str) -> Option<String> {
    let head = value.split('/').next().unwrap_or(value);
    let normalized = normalize_field(head)?;
    let trimmed = normalized.trim_start_matches('0');
    if trimmed.is_empty() {
        Some("0".to_string())
    } else {
        Some(trimmed.to_string())
    }
}

fn field(value: Option<&str>) -> Option<String> {
    value.and_then(normalize_field)
}

/// Derive the canonical key, or `None` when the game's required fields are
/// missing.
pub fn canonical_key(fields: &KeyFields<'_>) -> Option<String> {
    let game = Game::from_category(fields.category);
    let set = field(fields.set_code);
    let number = fields.card_number.and_then(normalize_collector_number);
    let code = field(fields.card_code);
    let variant = field(fields.variant);

    match game {
        Game::Yugioh => code.map(|code| format!("yugioh:{}", code)),
        Game::OnePiece => code.map(|code| match variant {
            Some(variant) => format!("one_piece:{}:{}", code, variant),
            None => format!("one_piece:{}", code),
        }),
        Game::Pokemon => {
            let (set, number) = (set?, number?);
            match field(fields.language).filter(|lang| lang != "en") {
                Some(lang) => Some(format!("pokemon:{}:{}:{}", set, number, lang)),
                None => Some(format!("pokemon:{}:{}", set, number)),
            }
        }
        Game::Lorcana => Some(format!("lorcana:{}:{}", set?, number?)),
        Game::Mtg => {
            let (set, number) = (set?, number?);
            match variant {
                Some(variant) => Some(format!("mtg:{}:{}:{}", set, number, variant)),
                None => Some(format!("mtg:{}:{}", set, number)),
            }
        }
        Game::Sports | Game::Other => {
            let category = normalize_field(fields.category)?;
            Some(format!("{}:{}:{}", category, set?, number?))
        }
    }
}
