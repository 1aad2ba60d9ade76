//! Lexical Resource Module
//!
//! Reads a directory of synset files, decodes each into [`LexicalEntry`]
//! records keyed by synset id, and flattens entries into word rows ready
//! for the dictionary store.

mod entry;
mod error;
mod normalize;
mod parser;
mod source;

pub use entry::{Examples, LexicalEntry, PartOfSpeech, UnknownPartOfSpeech};
pub use error::{ParseError, Result};
pub use normalize::{flatten_file, NewWordInput, DEFINITION_SEPARATOR};
pub use parser::{
    LexicalParser, ParsedBatch, ParsedFile, DEFAULT_CAPTURE_CONCURRENCY, SOURCE_EXTENSION,
};
pub use source::{LocalFs, SourceFile, SourceFs};
