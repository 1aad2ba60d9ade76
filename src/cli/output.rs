//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::core::IngestReport;
use crate::database::{WordDefinitions, WordMatches, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};

/// Result of `migrate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationResult {
    pub database: String,
    pub schema_version: i32,
}

/// Result of `reindex`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResult {
    pub indexed: u64,
}

/// Human-readable rendering of a command result.
pub trait PlainOutput {
    fn write_plain(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Write a result in the requested format.
pub fn output_result<T>(result: &T, format: OutputFormat, out: &mut dyn Write) -> io::Result<()>
where
    T: Serialize + PlainOutput,
{
    match format {
        OutputFormat::Plain => result.write_plain(out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result).map_err(io::Error::other)?;
            writeln!(out)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(result).map_err(io::Error::other)?;
            out.write_all(yaml.as_bytes())
        }
    }
}

impl PlainOutput for WordDefinitions {
    fn write_plain(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "No definitions found for '{}'.", self.word);
        }

        for definition in &self.definitions {
            let flag = if definition.explicit { " [explicit]" } else { "" };
            writeln!(out, "{} ({}){}", self.word, definition.part_of_speech.label(), flag)?;
            for (n, gloss) in definition.glosses().enumerate() {
                writeln!(out, "  {}. {}", n + 1, gloss)?;
            }
        }
        Ok(())
    }
}

impl PlainOutput for WordMatches {
    fn write_plain(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            return writeln!(out, "No matching words.");
        }

        for hit in &self.matching_words {
            let definition = hit
                .definition
                .replace(HIGHLIGHT_OPEN, "*")
                .replace(HIGHLIGHT_CLOSE, "*");
            writeln!(
                out,
                "{:<24} {:<10} {}",
                hit.word,
                hit.part_of_speech.label(),
                definition
            )?;
        }

        if let Some(cursor) = self.cursor {
            writeln!(out)?;
            writeln!(out, "Next page: --cursor {cursor}")?;
        }
        Ok(())
    }
}

impl PlainOutput for IngestReport {
    fn write_plain(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Files:       {} of {}", self.files, self.listed)?;
        writeln!(out, "Entries:     {}", self.entries)?;
        writeln!(out, "Words:       {}", self.words)?;
        writeln!(out, "Definitions: {}", self.definitions)?;
        if self.discarded_batches > 0 {
            writeln!(out, "Discarded:   {}", self.discarded_batches)?;
        }
        if self.rejected_batches > 0 {
            writeln!(out, "Rejected:    {}", self.rejected_batches)?;
        }
        if let Some(indexed) = self.indexed {
            writeln!(out, "Indexed:     {indexed}")?;
        }
        Ok(())
    }
}

impl PlainOutput for MigrationResult {
    fn write_plain(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "Database {} is at schema version {}",
            self.database, self.schema_version
        )
    }
}

impl PlainOutput for IndexResult {
    fn write_plain(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Indexed {} definitions", self.indexed)
    }
}
