//! Synset records as they appear in the source corpus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Part of Speech
// ============================================================================

/// Single-letter part-of-speech code used by the corpus and the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartOfSpeech {
    #[serde(rename = "a")]
    Adjective,
    #[serde(rename = "s")]
    AdjectiveSatellite,
    #[serde(rename = "r")]
    Adverb,
    #[serde(rename = "n")]
    Noun,
    #[serde(rename = "v")]
    Verb,
    /// Wildcard: matches every part of speech. Never stored.
    #[serde(rename = "*")]
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown part of speech: {0:?}")]
pub struct UnknownPartOfSpeech(pub String);

impl PartOfSpeech {
    /// Every part of speech a word row can carry.
    pub const CONCRETE: [PartOfSpeech; 5] = [
        PartOfSpeech::Adjective,
        PartOfSpeech::AdjectiveSatellite,
        PartOfSpeech::Adverb,
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PartOfSpeech::Adjective => "a",
            PartOfSpeech::AdjectiveSatellite => "s",
            PartOfSpeech::Adverb => "r",
            PartOfSpeech::Noun => "n",
            PartOfSpeech::Verb => "v",
            PartOfSpeech::Any => "*",
        }
    }

    /// Human-readable name. Satellites read as plain adjectives.
    pub fn label(self) -> &'static str {
        match self {
            PartOfSpeech::Adjective | PartOfSpeech::AdjectiveSatellite => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Any => "*",
        }
    }

    pub fn is_any(self) -> bool {
        self == PartOfSpeech::Any
    }

    /// Code to filter on, or `None` when every part of speech matches.
    pub fn filter_code(pos: Option<Self>) -> Option<&'static str> {
        pos.filter(|p| !p.is_any()).map(PartOfSpeech::code)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PartOfSpeech {
    type Err = UnknownPartOfSpeech;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "adj" | "adjective" => Ok(PartOfSpeech::Adjective),
            "s" | "satellite" | "adjective-satellite" => Ok(PartOfSpeech::AdjectiveSatellite),
            "r" | "adv" | "adverb" => Ok(PartOfSpeech::Adverb),
            "n" | "noun" => Ok(PartOfSpeech::Noun),
            "v" | "verb" => Ok(PartOfSpeech::Verb),
            "*" | "any" | "all" => Ok(PartOfSpeech::Any),
            _ => Err(UnknownPartOfSpeech(s.to_string())),
        }
    }
}

// ============================================================================
// Examples
// ============================================================================

/// Usage examples. The corpus is inconsistent: a bare string, a list of
/// strings, or anything else (attributed maps, numbers) kept as raw YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Examples {
    One(String),
    Many(Vec<String>),
    Other(serde_yaml::Value),
}

impl Examples {
    /// Example sentences as text. Maps contribute their `text` field;
    /// other non-string values are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: Vec<&str> = match self {
            Examples::One(s) => vec![s.as_str()],
            Examples::Many(v) => v.iter().map(String::as_str).collect(),
            Examples::Other(value) => match value {
                serde_yaml::Value::Sequence(items) => items.iter().filter_map(example_text).collect(),
                other => example_text(other).into_iter().collect(),
            },
        };
        items.into_iter()
    }

    pub fn len(&self) -> usize {
        match self {
            Examples::One(_) => 1,
            Examples::Many(v) => v.len(),
            Examples::Other(serde_yaml::Value::Sequence(items)) => items.len(),
            Examples::Other(serde_yaml::Value::Null) => 0,
            Examples::Other(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn example_text(value: &serde_yaml::Value) -> Option<&str> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Mapping(map) => map.get("text").and_then(serde_yaml::Value::as_str),
        _ => None,
    }
}

// ============================================================================
// Lexical Entry
// ============================================================================

/// One synset from a source file.
///
/// ```yaml
/// 00003552-s:
///   definition:
///   - coming into existence
///   example:
///   - an emergent republic
///   ili: i10
///   members:
///   - emergent
///   - emerging
///   partOfSpeech: s
///   similar:
///   - 00003356-a
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalEntry {
    /// Synset id; the key this entry was stored under.
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: PartOfSpeech,
    #[serde(rename = "definition", default)]
    pub definitions: Vec<String>,
    #[serde(rename = "example", default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Examples>,
    #[serde(rename = "ili", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Content-advisory marker carried onto every definition of the synset.
    #[serde(default)]
    pub explicit: bool,

    // Relations are carried through but never indexed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hypernym: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mero_part: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_topic: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar: Vec<String>,
    #[serde(rename = "atribute", default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl LexicalEntry {
    pub fn new(
        id: impl Into<String>,
        members: &[&str],
        part_of_speech: PartOfSpeech,
        definitions: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            members: members.iter().map(|m| m.to_string()).collect(),
            part_of_speech,
            definitions: definitions.iter().map(|d| d.to_string()).collect(),
            examples: None,
            identifier: None,
            explicit: false,
            hypernym: Vec::new(),
            mero_part: Vec::new(),
            domain_topic: Vec::new(),
            similar: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// An entry can only reach the store if at least one member survives trimming.
    pub fn is_indexable(&self) -> bool {
        self.members.iter().any(|m| !m.trim().is_empty())
    }
}
