//! Input Validator Module
//!
//! Checks caller input before it reaches the store.

use thiserror::Error;

use crate::lexicon::NewWordInput;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains null bytes")]
    NullByte { field: &'static str },

    #[error("word {word:?} needs a concrete part of speech, not the wildcard")]
    WildcardPartOfSpeech { word: String },

    #[error("word {word:?} has no definitions")]
    NoDefinitions { word: String },

    #[error("batch of {size} words exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

// ============================================================================
// Input Validator
// ============================================================================

pub struct InputValidator {
    max_word_length: usize,
    max_description_length: usize,
    max_batch_size: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self {
            max_word_length: 128,
            max_description_length: 512,
            max_batch_size: 10_000,
        }
    }

    /// A word to look up or store.
    pub fn validate_word(&self, word: &str) -> Result<()> {
        self.validate_text("word", word, self.max_word_length)?;
        if word.trim().is_empty() {
            return Err(ValidationError::Empty { field: "word" });
        }
        Ok(())
    }

    /// A free-text description. Empty is allowed: it means browse.
    pub fn validate_description(&self, description: &str) -> Result<()> {
        self.validate_text("description", description, self.max_description_length)
    }

    /// Every problem with one word; empty when the word is acceptable.
    pub fn validate_new_word(&self, input: &NewWordInput) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = self.validate_word(&input.word) {
            errors.push(e);
        }
        if input.part_of_speech.is_any() {
            errors.push(ValidationError::WildcardPartOfSpeech {
                word: input.word.clone(),
            });
        }
        if input.glosses().next().is_none() {
            errors.push(ValidationError::NoDefinitions {
                word: input.word.clone(),
            });
        }
        if input.definitions.iter().any(|d| d.contains('\0')) {
            errors.push(ValidationError::NullByte { field: "definition" });
        }

        errors
    }

    /// Every problem across a batch.
    pub fn validate_batch(&self, batch: &[NewWordInput]) -> Vec<ValidationError> {
        if batch.len() > self.max_batch_size {
            return vec![ValidationError::BatchTooLarge {
                size: batch.len(),
                max: self.max_batch_size,
            }];
        }

        batch
            .iter()
            .flat_map(|input| self.validate_new_word(input))
            .collect()
    }

    fn validate_text(&self, field: &'static str, input: &str, max: usize) -> Result<()> {
        if input.contains('\0') {
            return Err(ValidationError::NullByte { field });
        }
        if input.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
        Ok(())
    }
}
