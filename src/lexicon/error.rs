use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Failures while listing, reading or decoding source files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot list source directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported file type: {name} (expected .{expected})")]
    UnsupportedFileType { name: String, expected: &'static str },

    #[error("cannot read source file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed source file {path}: {source}")]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ParseError {
    /// Errors that skip a single file instead of aborting a batch.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ParseError::UnsupportedFileType { .. } | ParseError::SourceUnreadable { .. }
        )
    }
}
