pub mod error;
pub mod logging;
pub mod service;
pub mod validation;

pub use error::{DictionaryError, Result};
pub use service::{
    with_deadline, DictionaryService, FindWordsInput, GetWordDefinitionsInput, IngestReport,
    ServiceOptions,
};
pub use validation::{InputValidator, ValidationError};
