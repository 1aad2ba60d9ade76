//! Search Tests
//!
//! Reverse lookup over the full-text index: filters, highlighting,
//! browse mode and cursor paging.

use std::collections::HashSet;

use crate::database::{
    Cursor, Database, SearchOps, SearchQuery, WordOps, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN, PAGE_SIZE,
};
use crate::lexicon::{NewWordInput, PartOfSpeech};
use crate::tests::common::{create_test_db, explicit_word, sample_words, seed, word};

fn query(text: &str) -> SearchQuery {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    SearchQuery::new(&tokens)
}

// =============================================================================
// Full-text Mode
// =============================================================================

#[tokio::test]
async fn test_search_by_description() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    let matches = db
        .search_words(&query("coming into existence").part_of_speech(PartOfSpeech::AdjectiveSatellite))
        .await
        .expect("Failed to search");

    let words: HashSet<&str> = matches.matching_words.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(words, HashSet::from(["emergent", "emerging"]));
    assert_eq!(matches.query.as_deref(), Some("coming into existence"));
    assert!(matches.cursor.is_some());

    for hit in &matches.matching_words {
        assert_eq!(hit.part_of_speech, PartOfSpeech::AdjectiveSatellite);
        assert!(hit.definition.contains(HIGHLIGHT_OPEN));
        assert!(hit.definition.contains(HIGHLIGHT_CLOSE));
        assert!(!hit.explicit);
    }
}

#[tokio::test]
async fn test_search_needs_index() {
    let (db, _temp) = create_test_db().await;
    db.insert_words(&sample_words()).await.unwrap();

    let matches = db.search_words(&query("existence")).await.unwrap();
    assert!(matches.is_empty());
    assert!(matches.cursor.is_none());

    db.reindex().await.unwrap();
    let matches = db.search_words(&query("existence")).await.unwrap();
    assert_eq!(matches.len(), 2);
}

#[tokio::test]
async fn test_search_filters_part_of_speech() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    let nouns = db
        .search_words(&query("existence").part_of_speech(PartOfSpeech::Noun))
        .await
        .unwrap();
    assert!(nouns.is_empty());

    let any = db
        .search_words(&query("existence").part_of_speech(PartOfSpeech::Any))
        .await
        .unwrap();
    let unfiltered = db.search_words(&query("existence")).await.unwrap();
    assert_eq!(any.len(), 2);
    assert_eq!(any.len(), unfiltered.len());
}

#[tokio::test]
async fn test_terms_are_or_joined() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    // Neither definition contains both terms.
    let matches = db.search_words(&query("countryside existence")).await.unwrap();
    let words: HashSet<&str> = matches.matching_words.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(words, HashSet::from(["emergent", "emerging", "rural"]));
}

#[tokio::test]
async fn test_search_terms_with_fts_syntax_are_literal() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    for text in ["\"existence", "existence*", "NEAR(existence)", "city AND -", "col:value"] {
        let result = db.search_words(&query(text)).await;
        assert!(result.is_ok(), "query {text:?} failed: {:?}", result.err());
    }
}

#[tokio::test]
async fn test_explicit_definitions_hidden_by_default() {
    let (db, _temp) = create_test_db().await;
    seed(
        &db,
        &[
            word("curse", PartOfSpeech::Verb, &["utter obscenities or profanities"]),
            explicit_word("swear", PartOfSpeech::Verb, &["utter obscenities or profanities"]),
        ],
    )
    .await;

    let default = db.search_words(&query("obscenities")).await.unwrap();
    let words: Vec<&str> = default.matching_words.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(words, vec!["curse"]);

    let all = db
        .search_words(&query("obscenities").include_explicit(true))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.matching_words.iter().any(|m| m.word == "swear" && m.explicit));
}

// =============================================================================
// Browse Mode
// =============================================================================

#[tokio::test]
async fn test_empty_query_browses() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    let matches = db.search_words(&SearchQuery::default()).await.unwrap();
    assert!(matches.query.is_none());

    let words: Vec<&str> = matches.matching_words.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(words, vec!["emergent", "emerging", "rural"]);
    for hit in &matches.matching_words {
        assert!(!hit.definition.contains(HIGHLIGHT_OPEN));
    }

    let whitespace = db.search_words(&SearchQuery::new(&["  ", "\t"])).await.unwrap();
    assert_eq!(whitespace.len(), 3);
}

#[tokio::test]
async fn test_browse_filters_part_of_speech() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    let matches = db
        .search_words(&SearchQuery::default().part_of_speech(PartOfSpeech::Adjective))
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches.matching_words[0].word, "rural");
}

// =============================================================================
// Paging
// =============================================================================

async fn seed_many(db: &Database, count: usize) {
    let batch: Vec<NewWordInput> = (0..count)
        .map(|i| {
            let gloss = format!("a common gloss numbered {i}");
            word(&format!("word{i:04}"), PartOfSpeech::Noun, &[gloss.as_str()])
        })
        .collect();
    seed(db, &batch).await;
}

async fn collect_pages(db: &Database, base: SearchQuery) -> Vec<Vec<i64>> {
    let mut pages = Vec::new();
    let mut cursor: Option<Cursor> = None;

    loop {
        let page = db.search_words(&base.clone().after(cursor)).await.unwrap();
        if page.is_empty() {
            assert!(page.cursor.is_none());
            break;
        }

        let ids: Vec<i64> = page.matching_words.iter().map(|m| m.id).collect();
        let next = page.cursor.expect("non-empty page has a cursor");
        assert_eq!(Some(next.id()), ids.iter().copied().max());
        if let Some(previous) = cursor {
            assert!(ids.iter().all(|id| *id > previous.id()));
        }

        pages.push(ids);
        cursor = Some(next);
    }

    pages
}

#[tokio::test]
async fn test_full_text_pages_cover_every_match_once() {
    let (db, _temp) = create_test_db().await;
    seed_many(&db, 250).await;

    let pages = collect_pages(&db, query("common")).await;

    let sizes: Vec<usize> = pages.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![PAGE_SIZE as usize, PAGE_SIZE as usize, 50]);

    let unique: HashSet<i64> = pages.iter().flatten().copied().collect();
    assert_eq!(unique.len(), 250);
}

#[tokio::test]
async fn test_browse_pages_cover_every_row_once() {
    let (db, _temp) = create_test_db().await;
    seed_many(&db, 120).await;

    let pages = collect_pages(&db, SearchQuery::default()).await;

    let sizes: Vec<usize> = pages.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![PAGE_SIZE as usize, 20]);

    let unique: HashSet<i64> = pages.iter().flatten().copied().collect();
    assert_eq!(unique.len(), 120);
}

#[tokio::test]
async fn test_ranking_applies_within_each_page() {
    let (db, _temp) = create_test_db().await;
    seed_many(&db, 150).await;
    seed(&db, &[word("zcommon", PartOfSpeech::Noun, &["common common common"])]).await;

    let first = db.search_words(&query("common")).await.unwrap();
    assert_eq!(first.len(), PAGE_SIZE as usize);
    assert!(first.matching_words.iter().all(|m| m.word != "zcommon"));

    let second = db.search_words(&query("common").after(first.cursor)).await.unwrap();
    assert_eq!(second.len(), 51);
    assert_eq!(second.matching_words[0].word, "zcommon");
}

#[tokio::test]
async fn test_cursor_past_end_is_empty() {
    let (db, _temp) = create_test_db().await;
    seed(&db, &sample_words()).await;

    let matches = db
        .search_words(&query("existence").after(Some(Cursor::new(1_000_000))))
        .await
        .unwrap();
    assert!(matches.is_empty());
    assert!(matches.cursor.is_none());
}
