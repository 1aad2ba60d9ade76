//! Flattening synsets into word rows.

use serde::{Deserialize, Serialize};

use super::entry::{Examples, LexicalEntry, PartOfSpeech};
use super::parser::ParsedFile;

/// Glosses of a word are stored as one string joined with this separator.
pub const DEFINITION_SEPARATOR: &str = "|";

/// One (word, part of speech, glosses) row on its way into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWordInput {
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub definitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Examples>,
    #[serde(default)]
    pub explicit: bool,
    /// Interlingual index of the source synset (`ili`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_code: Option<String>,
}

impl NewWordInput {
    pub fn new(word: impl Into<String>, part_of_speech: PartOfSpeech, definitions: &[&str]) -> Self {
        Self {
            word: word.into(),
            part_of_speech,
            definitions: definitions.iter().map(|d| d.to_string()).collect(),
            examples: None,
            explicit: false,
            entry_code: None,
        }
    }

    /// Non-empty glosses, trimmed, in source order.
    pub fn glosses(&self) -> impl Iterator<Item = &str> {
        self.definitions
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
    }
}

impl LexicalEntry {
    /// One word row per member. Blank members are dropped.
    pub fn words(&self) -> Vec<NewWordInput> {
        self.members
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(|member| NewWordInput {
                word: member.to_string(),
                part_of_speech: self.part_of_speech,
                definitions: self.definitions.clone(),
                examples: self.examples.clone(),
                explicit: self.explicit,
                entry_code: self.identifier.clone(),
            })
            .collect()
    }
}

/// Insert batches for a whole file: one per indexable entry, in synset-id order.
pub fn flatten_file(file: &ParsedFile) -> impl Iterator<Item = Vec<NewWordInput>> + '_ {
    file.entries
        .values()
        .filter(|e| e.is_indexable())
        .map(LexicalEntry::words)
}
