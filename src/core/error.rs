//! Error types for dictionary operations.

use std::time::Duration;

use thiserror::Error;

use super::validation::ValidationError;
use crate::lexicon::ParseError;

/// Result type alias for dictionary operations.
pub type Result<T> = std::result::Result<T, DictionaryError>;

#[derive(Error, Debug)]
pub enum DictionaryError {
    /// Rejected before reaching the store. Lists every problem found.
    #[error("invalid input: {}", .0.join("; "))]
    InputInvalid(Vec<String>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Any failed statement. The enclosing transaction was rolled back.
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Word ids returned by an insert did not match the batch size.
    #[error("batch discarded: {actual} word ids returned for {expected} words")]
    ConsistencyAnomaly { expected: usize, actual: usize },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DictionaryError {
    /// Stable name of the error class, as reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            DictionaryError::InputInvalid(_) => "InputInvalid",
            DictionaryError::Parse(ParseError::MalformedSource { .. }) => "MalformedSource",
            DictionaryError::Parse(ParseError::UnsupportedFileType { .. }) => "UnsupportedFileType",
            DictionaryError::Parse(_) => "SourceUnreadable",
            DictionaryError::Persistence(_) => "PersistenceFailure",
            DictionaryError::ConsistencyAnomaly { .. } => "ConsistencyAnomaly",
            DictionaryError::Timeout { .. } => "Timeout",
            DictionaryError::Task(_) => "TaskFailure",
            DictionaryError::Config(_) => "Config",
        }
    }
}

impl From<ValidationError> for DictionaryError {
    fn from(e: ValidationError) -> Self {
        DictionaryError::InputInvalid(vec![e.to_string()])
    }
}

impl From<Vec<ValidationError>> for DictionaryError {
    fn from(errors: Vec<ValidationError>) -> Self {
        DictionaryError::InputInvalid(errors.iter().map(ToString::to_string).collect())
    }
}
