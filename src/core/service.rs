//! Dictionary Service
//!
//! Validated entry points over the store, shared by the CLI and the HTTP
//! API, plus the ingestion pipeline that feeds parsed source files into
//! the store.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::error::{DictionaryError, Result};
use super::validation::InputValidator;
use crate::database::{
    Cursor, Database, InsertReport, SearchOps, SearchQuery, WordDefinitions, WordMatches, WordOps,
};
use crate::lexicon::{
    flatten_file, LexicalParser, LocalFs, NewWordInput, ParsedFile, PartOfSpeech,
    DEFAULT_CAPTURE_CONCURRENCY,
};

// ============================================================================
// Inputs and Reports
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetWordDefinitionsInput {
    pub word: String,
    #[serde(default)]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(default)]
    pub verbatim: bool,
}

impl GetWordDefinitionsInput {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindWordsInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub part_of_speech: Option<PartOfSpeech>,
    #[serde(rename = "cursor_id", default)]
    pub cursor: Option<Cursor>,
    #[serde(default)]
    pub include_explicit: bool,
}

impl FindWordsInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    fn to_query(&self) -> SearchQuery {
        let tokens: Vec<&str> = self.description.split_whitespace().collect();
        SearchQuery {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            part_of_speech: self.part_of_speech,
            cursor: self.cursor,
            include_explicit: self.include_explicit,
        }
    }
}

/// Outcome of [`DictionaryService::ingest_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Source files listed in the directory.
    pub listed: usize,
    /// Files parsed and written.
    pub files: usize,
    /// Entries (synsets) written.
    pub entries: u64,
    pub words: u64,
    pub definitions: u64,
    /// Batches dropped on a word id count mismatch.
    pub discarded_batches: u64,
    /// Batches refused by validation.
    pub rejected_batches: u64,
    /// Rows in the search index after the rebuild, when one ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub capture_concurrency: usize,
    /// Parsed files buffered between the parser and the writer.
    pub handoff_capacity: usize,
    /// Turn a discarded batch into an error instead of an empty success.
    pub strict_consistency: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            capture_concurrency: DEFAULT_CAPTURE_CONCURRENCY,
            handoff_capacity: DEFAULT_CAPTURE_CONCURRENCY,
            strict_consistency: false,
        }
    }
}

/// Fail with [`DictionaryError::Timeout`] unless `fut` finishes within `after`.
pub async fn with_deadline<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, ?after, "deadline exceeded");
            Err(DictionaryError::Timeout { operation, after })
        }
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct DictionaryService {
    db: Database,
    validator: Arc<InputValidator>,
    options: ServiceOptions,
}

impl DictionaryService {
    pub fn new(db: Database, options: ServiceOptions) -> Self {
        Self {
            db,
            validator: Arc::new(InputValidator::new()),
            options,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Validate and insert a batch. Nothing is written if any word is invalid.
    pub async fn create_words(&self, batch: &[NewWordInput]) -> Result<InsertReport> {
        let problems = self.validator.validate_batch(batch);
        if !problems.is_empty() {
            return Err(problems.into());
        }

        let report = self.db.insert_words(batch).await?;

        match report.discarded {
            Some(mismatch) if self.options.strict_consistency => {
                Err(DictionaryError::ConsistencyAnomaly {
                    expected: mismatch.expected,
                    actual: mismatch.actual,
                })
            }
            _ => Ok(report),
        }
    }

    pub async fn get_definition(&self, input: &GetWordDefinitionsInput) -> Result<WordDefinitions> {
        self.validator.validate_word(&input.word)?;

        let definitions = self
            .db
            .get_definitions(&input.word, input.part_of_speech, input.verbatim)
            .await?;
        Ok(definitions)
    }

    pub async fn find_matching_words(&self, input: &FindWordsInput) -> Result<WordMatches> {
        self.validator.validate_description(&input.description)?;

        let matches = self.db.search_words(&input.to_query()).await?;
        Ok(matches)
    }

    /// Rebuild the search index. Returns the number of indexed rows.
    pub async fn index_words(&self) -> Result<u64> {
        Ok(self.db.reindex().await?)
    }

    /// Load every source file under `dir` from the local filesystem.
    pub async fn ingest_directory(&self, dir: &Path, reindex: bool) -> Result<IngestReport> {
        let parser = LexicalParser::new(Arc::new(LocalFs), self.options.capture_concurrency);
        self.ingest_with(&parser, dir, reindex).await
    }

    /// Parse `dir` with `parser`, writing each file as soon as it is parsed.
    ///
    /// Files reach a single writer task through a bounded channel. A
    /// malformed file stops parsing; files already handed over are still
    /// written before the error is returned.
    pub async fn ingest_with(
        &self,
        parser: &LexicalParser,
        dir: &Path,
        reindex: bool,
    ) -> Result<IngestReport> {
        let files = parser.load_files(dir).await;
        info!(dir = %dir.display(), files = files.len(), "ingesting source directory");

        let (tx, rx) = mpsc::channel::<Arc<ParsedFile>>(self.options.handoff_capacity.max(1));
        let writer = tokio::spawn(self.clone().write_parsed_files(rx));

        let parsed = parser.parse_files_into(dir, &files, tx).await;
        let mut batch = match parsed {
            Ok(batch) => batch,
            Err(e) => {
                // Captures already fired drain into the writer before it stops.
                match writer.await {
                    Ok(Ok(_)) => {}
                    Ok(Err(write_error)) => {
                        warn!(error = %write_error, "writer failed during aborted ingest");
                    }
                    Err(join_error) => {
                        warn!(error = %join_error, "writer task died during aborted ingest");
                    }
                }
                return Err(e.into());
            }
        };
        batch.join_captures().await;
        drop(batch);

        let mut report = writer.await??;
        report.listed = files.len();

        if reindex {
            report.indexed = Some(self.index_words().await?);
        }

        info!(
            files = report.files,
            entries = report.entries,
            words = report.words,
            discarded = report.discarded_batches,
            rejected = report.rejected_batches,
            "ingest complete"
        );

        Ok(report)
    }

    async fn write_parsed_files(self, mut rx: mpsc::Receiver<Arc<ParsedFile>>) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        while let Some(file) = rx.recv().await {
            for words in flatten_file(&file) {
                match self.create_words(&words).await {
                    Ok(inserted) => {
                        report.entries += 1;
                        report.words += inserted.words;
                        report.definitions += inserted.definitions;
                        if inserted.discarded.is_some() {
                            report.discarded_batches += 1;
                        }
                    }
                    Err(DictionaryError::InputInvalid(problems)) => {
                        warn!(file = %file.name, ?problems, "entry rejected");
                        report.rejected_batches += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            report.files += 1;
            info!(file = %file.name, entries = file.len(), "source file written");
        }

        Ok(report)
    }
}
