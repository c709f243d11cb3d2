use serde::{Deserialize, Serialize};

/// A flashcard from the read-only catalog.
///
/// Cards are never created or mutated by the trainer itself; they are loaded
/// once from the catalog and handed to the scheduler by reference. The
/// front/reveal payload is carried in [`CardContent`] and is only looked at
/// when a card is shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: String,
    pub level: Difficulty,
    /// Inactive cards are permanently excluded from selection.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(flatten)]
    pub content: CardContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_active() -> bool {
    true
}

/// Variant payload of a card, discriminated by the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardContent {
    Noun {
        front: NounFront,
        reveal: NounReveal,
    },
    VerbPrep {
        front: VerbPrepFront,
        reveal: VerbPrepReveal,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NounFront {
    pub lemma: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NounReveal {
    pub article_nom: Article,
    pub plural: String,
    #[serde(default)]
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerbPrepFront {
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerbPrepReveal {
    pub pattern: String,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

/// Example sentence shown on the reveal side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Example {
    pub de: String,
}

/// Nominative article of a noun.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Article {
    Der,
    Die,
    Das,
}

impl Article {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Der => "der",
            Self::Die => "die",
            Self::Das => "das",
        }
    }
}

/// The kind of card, mirroring the `type` discriminator of [`CardContent`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Noun,
    VerbPrep,
}

impl CardType {
    pub const ALL: [CardType; 2] = [CardType::Noun, CardType::VerbPrep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::VerbPrep => "verb_prep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "noun" => Some(Self::Noun),
            "verb_prep" => Some(Self::VerbPrep),
            _ => None,
        }
    }
}

/// Difficulty level of a card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl Card {
    pub fn card_type(&self) -> CardType {
        match self.content {
            CardContent::Noun { .. } => CardType::Noun,
            CardContent::VerbPrep { .. } => CardType::VerbPrep,
        }
    }

    /// Text shown before the card is revealed.
    pub fn prompt(&self) -> &str {
        match &self.content {
            CardContent::Noun { front, .. } => &front.lemma,
            CardContent::VerbPrep { front, .. } => &front.pattern,
        }
    }

    /// Lines shown once the card is revealed.
    pub fn answer(&self) -> Vec<String> {
        match &self.content {
            CardContent::Noun { front, reveal } => {
                let mut lines = vec![
                    format!("{} {}", reveal.article_nom.as_str(), front.lemma),
                    format!("Plural: {}", reveal.plural),
                ];
                lines.extend(reveal.examples.iter().map(|ex| format!("  {}", ex.de)));
                lines
            }
            CardContent::VerbPrep { reveal, .. } => {
                let mut lines = vec![reveal.pattern.clone()];
                lines.extend(reveal.examples.iter().map(|ex| format!("  {}", ex.de)));
                if let Some(notes) = &reveal.notes {
                    lines.extend(notes.iter().map(|note| format!("Note: {}", note)));
                }
                lines
            }
        }
    }
}
