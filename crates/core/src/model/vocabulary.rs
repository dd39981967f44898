use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::VocabularyId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabularyError {
    #[error("word cannot be empty")]
    EmptyWord,

    #[error("translation cannot be empty")]
    EmptyTranslation,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── CATEGORY / DIFFICULTY ─────────────────────────────────────────────────────
//

/// Fixed topical tag for a vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Greetings,
    Numbers,
    Colors,
    Food,
    Animals,
    Travel,
    Business,
    Daily,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Greetings,
        Category::Numbers,
        Category::Colors,
        Category::Food,
        Category::Animals,
        Category::Travel,
        Category::Business,
        Category::Daily,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Greetings => "greetings",
            Category::Numbers => "numbers",
            Category::Colors => "colors",
            Category::Food => "food",
            Category::Animals => "animals",
            Category::Travel => "travel",
            Category::Business => "business",
            Category::Daily => "daily",
        }
    }

    /// Display name shown to learners.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Greetings => "Greetings",
            Category::Numbers => "Numbers",
            Category::Colors => "Colors",
            Category::Food => "Food",
            Category::Animals => "Animals",
            Category::Travel => "Travel",
            Category::Business => "Business",
            Category::Daily => "Daily Life",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| VocabularyError::UnknownCategory(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(VocabularyError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// A read-only catalog word with its translation and optional study aids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    id: VocabularyId,
    word: String,
    translation: String,
    category: Category,
    difficulty: Difficulty,
    pronunciation: Option<String>,
    example_sentence: Option<String>,
    example_translation: Option<String>,
    audio_url: Option<Url>,
    image_url: Option<Url>,
    created_at: DateTime<Utc>,
}

impl VocabularyEntry {
    /// Creates an entry with the required fields; optional aids default to absent.
    ///
    /// Word and translation are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::EmptyWord` / `EmptyTranslation` for blank text.
    pub fn new(
        id: VocabularyId,
        word: impl Into<String>,
        translation: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        created_at: DateTime<Utc>,
    ) -> Result<Self, VocabularyError> {
        let word = word.into().trim().to_owned();
        if word.is_empty() {
            return Err(VocabularyError::EmptyWord);
        }
        let translation = translation.into().trim().to_owned();
        if translation.is_empty() {
            return Err(VocabularyError::EmptyTranslation);
        }

        Ok(Self {
            id,
            word,
            translation,
            category,
            difficulty,
            pronunciation: None,
            example_sentence: None,
            example_translation: None,
            audio_url: None,
            image_url: None,
            created_at,
        })
    }

    #[must_use]
    pub fn with_pronunciation(mut self, pronunciation: Option<String>) -> Self {
        self.pronunciation = non_blank(pronunciation);
        self
    }

    #[must_use]
    pub fn with_example(mut self, sentence: Option<String>, translation: Option<String>) -> Self {
        self.example_sentence = non_blank(sentence);
        self.example_translation = non_blank(translation);
        self
    }

    #[must_use]
    pub fn with_media(mut self, audio_url: Option<Url>, image_url: Option<Url>) -> Self {
        self.audio_url = audio_url;
        self.image_url = image_url;
        self
    }

    #[must_use]
    pub fn id(&self) -> VocabularyId {
        self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn translation(&self) -> &str {
        &self.translation
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn pronunciation(&self) -> Option<&str> {
        self.pronunciation.as_deref()
    }

    #[must_use]
    pub fn example_sentence(&self) -> Option<&str> {
        self.example_sentence.as_deref()
    }

    #[must_use]
    pub fn example_translation(&self) -> Option<&str> {
        self.example_translation.as_deref()
    }

    #[must_use]
    pub fn audio_url(&self) -> Option<&Url> {
        self.audio_url.as_ref()
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

/// Catalog query: every present criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl VocabularyFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Blank search text is treated as no search.
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = non_blank(search);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Search term lowered for case-insensitive matching.
    #[must_use]
    pub fn search_needle(&self) -> Option<String> {
        self.search.as_deref().map(str::to_lowercase)
    }

    /// Whether `entry` passes category, difficulty and text criteria.
    ///
    /// Text search matches a substring of either the word or the translation,
    /// case-insensitively. `limit` is not considered here.
    #[must_use]
    pub fn matches(&self, entry: &VocabularyEntry) -> bool {
        if self.category.is_some_and(|c| c != entry.category()) {
            return false;
        }
        if self.difficulty.is_some_and(|d| d != entry.difficulty()) {
            return false;
        }
        match self.search_needle() {
            Some(needle) => {
                entry.word().to_lowercase().contains(&needle)
                    || entry.translation().to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
