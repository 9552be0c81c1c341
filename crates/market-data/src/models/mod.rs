//! Price source models
//!
//! This module contains the core data types exchanged with price sources:
//! - `types` - Source identifiers (SourceId)
//! - `game` - Trading card game classification (Game)
//! - `lookup` - Catalog identity handed to a source (ItemLookup)
//! - `observation` - Raw observations returned by sources (RawObservation, GradedPrice)

mod game;
mod lookup;
mod observation;
mod types;

pub use game::Game;
pub use lookup::ItemLookup;
pub use observation::{EventType, Grade, GradedPrice, RawObservation};
pub use types::{SourceId, UnknownSource};
