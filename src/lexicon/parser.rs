//! Lexical file parser
//!
//! Parsing is sequential, one file at a time. Each successfully parsed file
//! is handed to a caller-supplied capture callback on its own task, so the
//! consumer can start writing file N while file N+1 is still being decoded.
//! Spawned captures are bounded by a semaphore.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::entry::LexicalEntry;
use super::error::{ParseError, Result};
use super::source::{LocalFs, SourceFile, SourceFs};

/// Expected suffix of a source file.
pub const SOURCE_EXTENSION: &str = "yaml";

/// Captures allowed in flight before parsing waits for one to finish.
pub const DEFAULT_CAPTURE_CONCURRENCY: usize = 8;

/// A decoded source file: synset id to entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub name: String,
    pub entries: BTreeMap<String, LexicalEntry>,
}

impl ParsedFile {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of word rows this file flattens into.
    pub fn word_count(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.members.iter().filter(|m| !m.trim().is_empty()).count())
            .sum()
    }
}

/// Result of [`LexicalParser::parse_files`].
///
/// Dropping a batch detaches its pending captures; they still run to completion.
#[derive(Debug)]
pub struct ParsedBatch {
    pub files: Vec<Arc<ParsedFile>>,
    captures: Vec<JoinHandle<()>>,
}

impl ParsedBatch {
    pub fn pending_captures(&self) -> usize {
        self.captures.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every capture fired by this batch.
    pub async fn join_captures(&mut self) {
        for handle in self.captures.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "capture task failed");
            }
        }
    }

    pub fn into_files(self) -> Vec<Arc<ParsedFile>> {
        self.files
    }
}

pub struct LexicalParser {
    fs: Arc<dyn SourceFs>,
    capture_permits: Arc<Semaphore>,
}

impl Default for LexicalParser {
    fn default() -> Self {
        Self::new(Arc::new(LocalFs), DEFAULT_CAPTURE_CONCURRENCY)
    }
}

impl LexicalParser {
    pub fn new(fs: Arc<dyn SourceFs>, capture_concurrency: usize) -> Self {
        Self {
            fs,
            capture_permits: Arc::new(Semaphore::new(capture_concurrency.max(1))),
        }
    }

    /// List a source directory, sorted by name.
    pub async fn list_source_files(&self, dir: &Path) -> Result<Vec<SourceFile>> {
        let mut files = self
            .fs
            .read_dir(dir)
            .await
            .map_err(|source| ParseError::DirectoryUnreadable {
                path: dir.to_path_buf(),
                source,
            })?;
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Like [`list_source_files`](Self::list_source_files), but an unreadable
    /// directory yields nothing.
    pub async fn load_files(&self, dir: &Path) -> Vec<SourceFile> {
        match self.list_source_files(dir).await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "no source files loaded");
                Vec::new()
            }
        }
    }

    pub async fn parse_file(&self, dir: &Path, file: &SourceFile) -> Result<ParsedFile> {
        if file.is_dir || file.extension() != Some(SOURCE_EXTENSION) {
            return Err(ParseError::UnsupportedFileType {
                name: file.name.clone(),
                expected: SOURCE_EXTENSION,
            });
        }

        let path = dir.join(&file.name);
        let contents = self
            .fs
            .read(&path)
            .await
            .map_err(|source| ParseError::SourceUnreadable {
                path: path.clone(),
                source,
            })?;

        let mut entries: BTreeMap<String, LexicalEntry> =
            if contents.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                serde_yaml::from_slice(&contents)
                    .map_err(|source| ParseError::MalformedSource { path, source })?
            };

        for (id, entry) in entries.iter_mut() {
            entry.id.clone_from(id);
        }

        debug!(file = %file.name, entries = entries.len(), "parsed source file");

        Ok(ParsedFile {
            name: file.name.clone(),
            entries,
        })
    }

    /// Parse `files` in order, firing `capture` on a new task for each parsed file.
    ///
    /// Unsupported and unreadable files are logged and left out of the batch.
    /// A malformed file aborts the call; captures already fired keep running.
    pub async fn parse_files<C, Fut>(
        &self,
        dir: &Path,
        files: &[SourceFile],
        capture: C,
    ) -> Result<ParsedBatch>
    where
        C: Fn(Arc<ParsedFile>) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut batch = ParsedBatch {
            files: Vec::with_capacity(files.len()),
            captures: Vec::with_capacity(files.len()),
        };

        for file in files {
            let parsed = match self.parse_file(dir, file).await {
                Ok(parsed) => Arc::new(parsed),
                Err(e) if e.is_skippable() => {
                    warn!(file = %file.name, error = %e, "skipping source file");
                    continue;
                }
                Err(e) => {
                    error!(file = %file.name, error = %e, "aborting parse batch");
                    return Err(e);
                }
            };

            // The semaphore is never closed, so acquiring only waits.
            let permit = Arc::clone(&self.capture_permits).acquire_owned().await.ok();
            let pending = capture(Arc::clone(&parsed));
            batch.captures.push(tokio::spawn(async move {
                let _permit = permit;
                pending.await;
            }));

            batch.files.push(parsed);
        }

        Ok(batch)
    }

    /// [`parse_files`](Self::parse_files) with every parsed file forwarded into `tx`.
    pub async fn parse_files_into(
        &self,
        dir: &Path,
        files: &[SourceFile],
        tx: mpsc::Sender<Arc<ParsedFile>>,
    ) -> Result<ParsedBatch> {
        self.parse_files(dir, files, move |parsed| {
            let tx = tx.clone();
            async move {
                let name = parsed.name.clone();
                if tx.send(parsed).await.is_err() {
                    debug!(file = %name, "parsed file dropped, consumer closed");
                }
            }
        })
        .await
    }
}
