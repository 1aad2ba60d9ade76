//! Dictionary Records
//!
//! Rows of the authoritative tables and the shapes returned by lookups.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::search::Cursor;
use crate::lexicon::{PartOfSpeech, DEFINITION_SEPARATOR};

// ============================================================================
// Table Records
// ============================================================================

/// `words` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WordRecord {
    pub id: i64,
    pub word: String,
    pub part_of_speech: String,
}

/// `definitions` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DefinitionRecord {
    pub id: i64,
    pub word_id: i64,
    pub definitions: String,
    pub explicit: bool,
}

// ============================================================================
// Lookup Results
// ============================================================================

/// One definition row of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinition {
    pub part_of_speech: PartOfSpeech,
    #[serde(rename = "text")]
    pub definition: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explicit: bool,
}

impl WordDefinition {
    /// Individual glosses of the stored definition text.
    pub fn glosses(&self) -> impl Iterator<Item = &str> {
        self.definition
            .split(DEFINITION_SEPARATOR)
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinitions {
    pub word: String,
    pub definitions: Vec<WordDefinition>,
}

impl WordDefinitions {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// A search hit. `definition` carries highlight markers in full-text mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingWord {
    pub id: i64,
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub definition: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explicit: bool,
}

/// A page of search hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordMatches {
    /// Pass back to fetch the next page; absent once a page comes back empty.
    #[serde(rename = "cursor_id", default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub matching_words: Vec<MatchingWord>,
}

impl WordMatches {
    pub fn len(&self) -> usize {
        self.matching_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matching_words.is_empty()
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

pub(crate) fn decode_part_of_speech(code: &str) -> Result<PartOfSpeech, sqlx::Error> {
    code.parse::<PartOfSpeech>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
