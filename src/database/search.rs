//! Dictionary read path
//!
//! Two lookups: the definitions of a word, and the words whose definitions
//! match a free-text description. Search runs in one of two modes chosen
//! once from the query tokens:
//!
//! - [`SearchMode::FullText`]: FTS5 `MATCH` over the index, ranked, with
//!   highlighted excerpts.
//! - [`SearchMode::Browse`]: no tokens, plain scan of the base tables.
//!
//! Both page through rows by definition id. A page is the next
//! [`PAGE_SIZE`] matching ids after the cursor, ordered for display within
//! the page (rank then word, or word then part of speech).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use tracing::debug;

use super::models::{decode_part_of_speech, MatchingWord, WordDefinition, WordDefinitions, WordMatches};
use super::Database;
use crate::lexicon::PartOfSpeech;

/// Rows per search page.
pub const PAGE_SIZE: i64 = 100;

pub const HIGHLIGHT_OPEN: &str = "<mark>";
pub const HIGHLIGHT_CLOSE: &str = "</mark>";
const SNIPPET_ELLIPSIS: &str = "…";
const SNIPPET_TOKENS: u32 = 32;

// ============================================================================
// Cursor
// ============================================================================

/// Continuation token: the id of the last row of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cursor(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cursor: {0:?}")]
pub struct InvalidCursor(pub String);

impl Cursor {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cursor {
    type Err = InvalidCursor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(id) if id >= 0 => Ok(Self(id)),
            _ => Err(InvalidCursor(s.to_string())),
        }
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.to_string()
    }
}

impl TryFrom<String> for Cursor {
    type Error = InvalidCursor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Query
// ============================================================================

/// Reverse-lookup request as the store sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub tokens: Vec<String>,
    pub part_of_speech: Option<PartOfSpeech>,
    pub cursor: Option<Cursor>,
    pub include_explicit: bool,
}

impl SearchQuery {
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn part_of_speech(mut self, pos: PartOfSpeech) -> Self {
        self.part_of_speech = Some(pos);
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn include_explicit(mut self, include: bool) -> Self {
        self.include_explicit = include;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    FullText { expression: String },
    Browse,
}

impl SearchMode {
    /// Full text when any token has a searchable term, browse otherwise.
    ///
    /// Every whitespace-separated term is quoted for FTS5 and the terms are
    /// OR-ed, leaving relevance to the ranking function. Terms without a
    /// letter or digit would tokenize to nothing and are dropped.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let terms: Vec<String> = tokens
            .iter()
            .flat_map(|t| t.as_ref().split_whitespace())
            .filter(|term| term.chars().any(char::is_alphanumeric))
            .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
            .collect();

        if terms.is_empty() {
            SearchMode::Browse
        } else {
            SearchMode::FullText {
                expression: terms.join(" OR "),
            }
        }
    }

    /// SQL for this mode. Placeholders, in order: the match expression
    /// (full text only), the cursor, then the part of speech when filtered.
    pub fn statement(&self, filter_part_of_speech: bool, include_explicit: bool) -> String {
        let mut conditions = Vec::new();
        if filter_part_of_speech {
            conditions.push("AND w.part_of_speech = ?");
        }
        if !include_explicit {
            conditions.push("AND d.explicit = 0");
        }
        let conditions = conditions.join("\n                    ");

        match self {
            SearchMode::FullText { .. } => format!(
                r#"
                SELECT id, word, part_of_speech, excerpt, explicit FROM (
                    SELECT
                        d.id AS id,
                        w.word AS word,
                        w.part_of_speech AS part_of_speech,
                        snippet(redic_, 0, '{open}', '{close}', '{ellipsis}', {tokens}) AS excerpt,
                        d.explicit AS explicit,
                        redic_.rank AS rank
                    FROM redic_
                        JOIN definitions d ON d.id = redic_.rowid
                        JOIN words w ON w.id = d.word_id
                    WHERE redic_ MATCH ?
                    AND redic_.rowid > ?
                    {conditions}
                    ORDER BY redic_.rowid
                    LIMIT {limit}
                )
                ORDER BY rank, word
                "#,
                open = HIGHLIGHT_OPEN,
                close = HIGHLIGHT_CLOSE,
                ellipsis = SNIPPET_ELLIPSIS,
                tokens = SNIPPET_TOKENS,
                limit = PAGE_SIZE,
            ),
            SearchMode::Browse => format!(
                r#"
                SELECT id, word, part_of_speech, excerpt, explicit FROM (
                    SELECT
                        d.id AS id,
                        w.word AS word,
                        w.part_of_speech AS part_of_speech,
                        d.definitions AS excerpt,
                        d.explicit AS explicit
                    FROM definitions d
                        JOIN words w ON w.id = d.word_id
                    WHERE d.id > ?
                    {conditions}
                    ORDER BY d.id
                    LIMIT {limit}
                )
                ORDER BY word, part_of_speech
                "#,
                limit = PAGE_SIZE,
            ),
        }
    }
}

#[derive(FromRow)]
struct DefinitionRow {
    part_of_speech: String,
    definitions: String,
    explicit: bool,
}

#[derive(FromRow)]
struct MatchRow {
    id: i64,
    word: String,
    part_of_speech: String,
    excerpt: String,
    explicit: bool,
}

// ============================================================================
// Operations
// ============================================================================

/// Extension trait for the dictionary read path
pub trait SearchOps {
    fn get_definitions(&self, word: &str, part_of_speech: Option<PartOfSpeech>, verbatim: bool) -> impl std::future::Future<Output = Result<WordDefinitions, sqlx::Error>> + Send;
    fn search_words(&self, query: &SearchQuery) -> impl std::future::Future<Output = Result<WordMatches, sqlx::Error>> + Send;
}

impl SearchOps for Database {
    /// Definitions of `word`, ordered by (word, part of speech).
    ///
    /// Without `verbatim` the word is trimmed and compared case-insensitively.
    /// A missing or wildcard part of speech returns every part of speech.
    async fn get_definitions(
        &self,
        word: &str,
        part_of_speech: Option<PartOfSpeech>,
        verbatim: bool,
    ) -> Result<WordDefinitions, sqlx::Error> {
        let pos_filter = PartOfSpeech::filter_code(part_of_speech);
        let lookup = if verbatim { word } else { word.trim() };

        let sql = format!(
            r#"
            SELECT w.part_of_speech AS part_of_speech, d.definitions AS definitions, d.explicit AS explicit
            FROM definitions d
                JOIN words w ON w.id = d.word_id
            WHERE w.word = ? {collate}
            {pos}
            ORDER BY w.word, w.part_of_speech
            "#,
            collate = if verbatim { "" } else { "COLLATE NOCASE" },
            pos = if pos_filter.is_some() { "AND w.part_of_speech = ?" } else { "" },
        );

        let mut query = sqlx::query_as::<_, DefinitionRow>(&sql).bind(lookup);
        if let Some(code) = pos_filter {
            query = query.bind(code);
        }
        let rows = query.fetch_all(self.pool()).await?;

        let definitions = rows
            .into_iter()
            .map(|row| {
                Ok(WordDefinition {
                    part_of_speech: decode_part_of_speech(&row.part_of_speech)?,
                    definition: row.definitions,
                    explicit: row.explicit,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(WordDefinitions {
            word: lookup.to_string(),
            definitions,
        })
    }

    /// One page of words whose definitions match `query`.
    ///
    /// A page is the next [`PAGE_SIZE`] matches by id after the cursor,
    /// ordered by rank within that window. Ranking is per page: a stronger
    /// match with a higher id can come on a later page.
    async fn search_words(&self, query: &SearchQuery) -> Result<WordMatches, sqlx::Error> {
        let mode = SearchMode::from_tokens(query.tokens.as_slice());
        let pos_filter = PartOfSpeech::filter_code(query.part_of_speech);
        let sql = mode.statement(pos_filter.is_some(), query.include_explicit);
        let after = query.cursor.map(Cursor::id).unwrap_or(0);

        let mut statement = sqlx::query_as::<_, MatchRow>(&sql);
        if let SearchMode::FullText { expression } = &mode {
            statement = statement.bind(expression.as_str());
        }
        statement = statement.bind(after);
        if let Some(code) = pos_filter {
            statement = statement.bind(code);
        }
        let rows = statement.fetch_all(self.pool()).await?;

        debug!(
            full_text = matches!(mode, SearchMode::FullText { .. }),
            after,
            rows = rows.len(),
            "search page"
        );

        let cursor = rows.iter().map(|r| r.id).max().map(Cursor::new);
        let matching_words = rows
            .into_iter()
            .map(|row| {
                Ok(MatchingWord {
                    id: row.id,
                    word: row.word,
                    part_of_speech: decode_part_of_speech(&row.part_of_speech)?,
                    definition: row.excerpt,
                    explicit: row.explicit,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let text = query.tokens.join(" ");
        let text = text.trim();

        Ok(WordMatches {
            cursor,
            query: (!text.is_empty()).then(|| text.to_string()),
            matching_words,
        })
    }
}
