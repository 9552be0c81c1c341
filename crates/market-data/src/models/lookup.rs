use super::game::Game;

/// Catalog identity handed to a price source.
///
/// Sources pick the fields they need: structured APIs query by set code and
/// collector number, free-text APIs build a search string from the name.
#[derive(Clone, Debug, Default)]
pub struct ItemLookup {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub game: Option<Game>,
    pub set_code: Option<String>,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub card_code: Option<String>,
    pub variant: Option<String>,
    pub language: Option<String>,
}

impl ItemLookup {
    pub fn game(&self) -> Game {
        self.game
            .unwrap_or_else(|| Game::from_category(&self.category))
    }

    /// Free-text query used by search-style sources.
    ///
    /// Joins the name with whichever of set name and card number are present.
    pub fn search_query(&self) -> String {
        let mut parts: Vec<&str> = vec![self.name.trim()];
        if let Some(set_name) = self.set_name.as_deref().map(str::trim) {
            if !set_name.is_empty() {
                parts.push(set_name);
            }
        }
        if let Some(number) = self.card_number.as_deref().map(str::trim) {
            if !number.is_empty() {
                parts.push(number);
            }
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}
