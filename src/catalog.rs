//! The read-only card catalog.
//!
//! The catalog is a JSON array of cards loaded once at startup. Card order is
//! preserved because the scheduler walks candidates in catalog order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Card, CardType, Difficulty};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate card id: {0}")]
    DuplicateId(String),
}

/// Which cards a training session draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFilter {
    pub types: Vec<CardType>,
    pub levels: Vec<Difficulty>,
}

impl Default for CardFilter {
    fn default() -> Self {
        Self {
            types: CardType::ALL.to_vec(),
            levels: Difficulty::ALL.to_vec(),
        }
    }
}

impl CardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        self.types.contains(&card.card_type()) && self.levels.contains(&card.level)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<Card>,
}

impl Catalog {
    pub fn new(cards: Vec<Card>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for card in &cards {
            if !seen.insert(card.id.as_str()) {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
        }
        Ok(Self { cards })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::debug!(cards = catalog.len(), path = %path.display(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Active cards matching `filter`, in catalog order.
    pub fn select(&self, filter: &CardFilter) -> Vec<Card> {
        self.cards
            .iter()
            .filter(|card| card.active && filter.matches(card))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = r#"[
        { "id": "tisch", "type": "noun", "level": "easy",
          "front": { "lemma": "Tisch" },
          "reveal": { "articleNom": "der", "plural": "Tische", "examples": [] } },
        { "id": "warten", "type": "verb_prep", "level": "medium",
          "front": { "pattern": "warten ___" },
          "reveal": { "pattern": "warten auf + Akk.", "examples": [] } },
        { "id": "lampe", "type": "noun", "level": "hard", "active": false,
          "front": { "lemma": "Lampe" },
          "reveal": { "articleNom": "die", "plural": "Lampen", "examples": [] } }
    ]"#;

    #[test]
    fn default_filter_keeps_all_active_cards_in_order() {
        let catalog = Catalog::from_json_str(CARDS).unwrap();
        let ids: Vec<_> = catalog
            .select(&CardFilter::default())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["tisch", "warten"]);
    }

    #[test]
    fn filter_by_type_and_level() {
        let catalog = Catalog::from_json_str(CARDS).unwrap();
        let filter = CardFilter {
            types: vec![CardType::VerbPrep],
            levels: vec![Difficulty::Medium, Difficulty::Hard],
        };
        let cards = catalog.select(&filter);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "warten");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[
            { "id": "a", "type": "noun", "level": "easy",
              "front": { "lemma": "A" }, "reveal": { "articleNom": "das", "plural": "As" } },
            { "id": "a", "type": "noun", "level": "easy",
              "front": { "lemma": "A" }, "reveal": { "articleNom": "das", "plural": "As" } }
        ]"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn rejects_unknown_card_type() {
        let json = r#"[{ "id": "x", "type": "adjective", "level": "easy", "front": {}, "reveal": {} }]"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CatalogError::Parse(_))
        ));
    }
}
