//! Word and definition write path
//!
//! Batch inserts and the full-text reindex. Both run inside a single
//! transaction and never partially commit.

use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use tracing::{error, info, warn};

use super::models::WordRecord;
use super::Database;
use crate::lexicon::{NewWordInput, PartOfSpeech};

/// Upsert that still returns the id of an existing row.
const UPSERT_WORD: &str = r#"
    INSERT INTO words (word, part_of_speech)
    VALUES (?, ?)
    ON CONFLICT (word, part_of_speech)
    DO UPDATE SET word = excluded.word
    RETURNING id
"#;

/// Appends one gloss unless the row already holds it; never overwrites.
const UPSERT_DEFINITION: &str = r#"
    INSERT INTO definitions (word_id, definitions, explicit)
    VALUES (?, ?, ?)
    ON CONFLICT (word_id) DO UPDATE SET
        definitions = CASE
            WHEN excluded.definitions = ''
                OR instr('|' || definitions.definitions || '|', '|' || excluded.definitions || '|') > 0
                THEN definitions.definitions
            WHEN definitions.definitions = '' THEN excluded.definitions
            ELSE definitions.definitions || '|' || excluded.definitions
        END,
        explicit = (definitions.explicit OR excluded.explicit)
"#;

/// Word ids returned by the upsert step did not match the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Outcome of [`WordOps::insert_words`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReport {
    /// Word rows inserted or matched.
    pub words: u64,
    /// Definition rows inserted or appended to.
    pub definitions: u64,
    /// Set when the batch was rolled back because of a count mismatch.
    /// The call still succeeds and nothing was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discarded: Option<CountMismatch>,
}

/// Extension trait for the dictionary write path
pub trait WordOps {
    fn insert_words(&self, words: &[NewWordInput]) -> impl std::future::Future<Output = Result<InsertReport, sqlx::Error>> + Send;
    fn reindex(&self) -> impl std::future::Future<Output = Result<u64, sqlx::Error>> + Send;

    fn get_word(&self, word: &str, part_of_speech: PartOfSpeech) -> impl std::future::Future<Output = Result<Option<WordRecord>, sqlx::Error>> + Send;
    fn count_words(&self) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;
    fn count_definitions(&self) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;
    fn count_indexed(&self) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;
}

impl WordOps for Database {
    /// Insert a batch of words and their definitions in one transaction.
    ///
    /// Each word is upserted on (word, part of speech); each of its glosses is
    /// then appended to the word's definition row unless already there. A statement failure rolls the
    /// whole batch back and is returned.
    async fn insert_words(&self, words: &[NewWordInput]) -> Result<InsertReport, sqlx::Error> {
        if words.is_empty() {
            return Ok(InsertReport::default());
        }

        let mut tx = self.pool().begin().await?;

        match insert_batch(&mut tx, words).await {
            Ok(report) if report.discarded.is_none() => {
                tx.commit().await?;
                Ok(report)
            }
            Ok(report) => {
                tx.rollback().await?;
                if let Some(mismatch) = report.discarded {
                    warn!(
                        expected = mismatch.expected,
                        actual = mismatch.actual,
                        "word id count mismatch, batch discarded"
                    );
                }
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, batch = words.len(), "batch insert failed, rolling back");
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Rebuild the full-text index from the definitions table.
    ///
    /// Delete and repopulate share one transaction, so a failure leaves the
    /// previous index intact. Returns the number of indexed rows.
    async fn reindex(&self) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM redic_").execute(&mut *tx).await?;
        sqlx::query(
            r#"
            INSERT INTO redic_ (rowid, definitions, word_id)
            SELECT id, definitions, word_id FROM definitions
            "#,
        )
        .execute(&mut *tx)
        .await?;

        let indexed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redic_")
            .fetch_one(&mut *tx)
            .await?;
        let expected: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM definitions")
            .fetch_one(&mut *tx)
            .await?;

        if indexed != expected {
            tx.rollback().await?;
            return Err(sqlx::Error::Protocol(format!(
                "reindex produced {indexed} rows for {expected} definitions"
            )));
        }

        tx.commit().await?;
        info!(rows = indexed, "search index rebuilt");

        Ok(indexed as u64)
    }

    async fn get_word(
        &self,
        word: &str,
        part_of_speech: PartOfSpeech,
    ) -> Result<Option<WordRecord>, sqlx::Error> {
        sqlx::query_as::<_, WordRecord>(
            "SELECT id, word, part_of_speech FROM words WHERE word = ? AND part_of_speech = ?",
        )
        .bind(word)
        .bind(part_of_speech.code())
        .fetch_optional(self.pool())
        .await
    }

    async fn count_words(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(self.pool())
            .await
    }

    async fn count_definitions(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM definitions")
            .fetch_one(self.pool())
            .await
    }

    async fn count_indexed(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM redic_")
            .fetch_one(self.pool())
            .await
    }
}

async fn insert_batch(
    tx: &mut Transaction<'_, Sqlite>,
    words: &[NewWordInput],
) -> Result<InsertReport, sqlx::Error> {
    let mut word_ids = Vec::with_capacity(words.len());

    for input in words {
        let id: Option<i64> = sqlx::query_scalar(UPSERT_WORD)
            .bind(&input.word)
            .bind(input.part_of_speech.code())
            .fetch_optional(&mut **tx)
            .await?;
        word_ids.extend(id);
    }

    if word_ids.len() != words.len() {
        return Ok(InsertReport {
            discarded: Some(CountMismatch {
                expected: words.len(),
                actual: word_ids.len(),
            }),
            ..InsertReport::default()
        });
    }

    let mut definitions = 0;
    for (input, word_id) in words.iter().zip(&word_ids) {
        let mut touched = false;
        for gloss in input.glosses() {
            let result = sqlx::query(UPSERT_DEFINITION)
                .bind(word_id)
                .bind(gloss)
                .bind(input.explicit)
                .execute(&mut **tx)
                .await?;
            touched |= result.rows_affected() > 0;
        }
        definitions += u64::from(touched);
    }

    Ok(InsertReport {
        words: word_ids.len() as u64,
        definitions,
        discarded: None,
    })
}
