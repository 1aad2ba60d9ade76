//! Lexical Parser Tests
//!
//! Drives the parser over an in-memory source directory.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::lexicon::{Examples, LexicalParser, ParseError, PartOfSpeech, SourceFile};
use crate::tests::common::{MemoryFs, ADJ_ALL_YAML, MALFORMED_YAML, NOUN_YAML};

const ROOT: &str = "/corpus";

fn corpus() -> MemoryFs {
    MemoryFs::new(ROOT)
        .with_file("adj.all.yaml", ADJ_ALL_YAML)
        .with_file("noun.Tops.yaml", NOUN_YAML)
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_source_files_sorted() {
    let parser = corpus().with_dir("nested").into_parser(2);

    let files = parser.list_source_files(Path::new(ROOT)).await.unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["adj.all.yaml", "nested", "noun.Tops.yaml"]);
    assert!(files[1].is_dir);
}

#[tokio::test]
async fn test_unreadable_directory() {
    let parser = corpus().into_parser(2);

    let err = parser.list_source_files(Path::new("/elsewhere")).await.unwrap_err();
    assert!(matches!(err, ParseError::DirectoryUnreadable { .. }));

    // The lenient variant degrades to nothing.
    assert!(parser.load_files(Path::new("/elsewhere")).await.is_empty());
}

// =============================================================================
// Single File
// =============================================================================

#[tokio::test]
async fn test_parse_file_decodes_entries() {
    let parser = corpus().into_parser(2);

    let parsed = parser
        .parse_file(Path::new(ROOT), &SourceFile::file("adj.all.yaml"))
        .await
        .expect("Failed to parse");

    assert_eq!(parsed.name, "adj.all.yaml");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.word_count(), 3);

    let emergent = &parsed.entries["00003552-s"];
    assert_eq!(emergent.id, "00003552-s");
    assert_eq!(emergent.members, vec!["emergent", "emerging"]);
    assert_eq!(emergent.part_of_speech, PartOfSpeech::AdjectiveSatellite);
    assert_eq!(emergent.definitions, vec!["coming into existence"]);
    assert_eq!(emergent.identifier.as_deref(), Some("i10"));
    assert_eq!(emergent.similar, vec!["00003356-a"]);
    assert_eq!(
        emergent.examples,
        Some(Examples::Many(vec!["an emergent republic".to_string()]))
    );

    // A bare string example decodes too.
    let rural = &parsed.entries["03045533-a"];
    assert_eq!(
        rural.examples,
        Some(Examples::One("rural electrification".to_string()))
    );
    assert!(!rural.explicit);
}

#[tokio::test]
async fn test_parse_file_accepts_untyped_examples() {
    let yaml = r#"
00003552-s:
  definition:
  - coming into existence
  example:
  - source: Some Book
    text: an emergent republic
  - plain sentence
  members:
  - emergent
  partOfSpeech: s
00009999-n:
  definition:
  - a year
  example: 1984
  members:
  - year
  partOfSpeech: n
"#;
    let parser = MemoryFs::new(ROOT).with_file("mixed.yaml", yaml).into_parser(2);

    let parsed = parser
        .parse_file(Path::new(ROOT), &SourceFile::file("mixed.yaml"))
        .await
        .expect("Failed to parse");
    assert_eq!(parsed.len(), 2);

    let emergent = parsed.entries["00003552-s"].examples.as_ref().unwrap();
    assert!(matches!(emergent, Examples::Other(_)));
    assert_eq!(emergent.len(), 2);
    assert_eq!(
        emergent.iter().collect::<Vec<_>>(),
        vec!["an emergent republic", "plain sentence"]
    );

    let year = parsed.entries["00009999-n"].examples.as_ref().unwrap();
    assert_eq!(year.len(), 1);
    assert_eq!(year.iter().count(), 0);
}

#[tokio::test]
async fn test_parse_file_rejects_other_types() {
    let parser = MemoryFs::new(ROOT)
        .with_file("README.md", "# corpus")
        .with_dir("sub.yaml")
        .into_parser(2);

    let err = parser
        .parse_file(Path::new(ROOT), &SourceFile::file("README.md"))
        .await
        .unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFileType { .. }));
    assert!(err.is_skippable());

    let err = parser
        .parse_file(Path::new(ROOT), &SourceFile::dir("sub.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFileType { .. }));
}

#[tokio::test]
async fn test_parse_empty_file() {
    let parser = MemoryFs::new(ROOT).with_file("empty.yaml", "\n  \n").into_parser(2);

    let parsed = parser
        .parse_file(Path::new(ROOT), &SourceFile::file("empty.yaml"))
        .await
        .unwrap();
    assert!(parsed.is_empty());
}

#[tokio::test]
async fn test_parse_malformed_file() {
    let parser = MemoryFs::new(ROOT)
        .with_file("bad.yaml", MALFORMED_YAML)
        .with_file("no-pos.yaml", "00001-n:\n  members: [thing]\n")
        .into_parser(2);

    for name in ["bad.yaml", "no-pos.yaml"] {
        let err = parser
            .parse_file(Path::new(ROOT), &SourceFile::file(name))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedSource { .. }), "{name}: {err}");
        assert!(!err.is_skippable());
    }
}

// =============================================================================
// Batches
// =============================================================================

#[tokio::test]
async fn test_parse_files_fires_capture_per_file() {
    let parser = corpus()
        .with_file("notes.txt", "not a source file")
        .with_unreadable("verb.locked.yaml")
        .into_parser(2);
    let files = parser.load_files(Path::new(ROOT)).await;

    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let mut batch = parser
        .parse_files(Path::new(ROOT), &files, move |parsed| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(parsed.name.clone());
            }
        })
        .await
        .expect("Skippable files must not fail the batch");

    batch.join_captures().await;
    assert_eq!(batch.pending_captures(), 0);

    let names: Vec<String> = batch.files.iter().map(|f| f.name.clone()).collect();
    assert_eq!(names, vec!["adj.all.yaml", "noun.Tops.yaml"]);

    let mut captured = captured.lock().unwrap().clone();
    captured.sort();
    assert_eq!(captured, names);
}

#[tokio::test]
async fn test_malformed_file_aborts_batch() {
    let parser = MemoryFs::new(ROOT)
        .with_file("a.yaml", ADJ_ALL_YAML)
        .with_file("b.yaml", MALFORMED_YAML)
        .with_file("c.yaml", NOUN_YAML)
        .into_parser(2);
    let files = parser.load_files(Path::new(ROOT)).await;

    let (tx, mut rx) = mpsc::channel(4);
    let err = parser
        .parse_files_into(Path::new(ROOT), &files, tx)
        .await
        .unwrap_err();
    assert!(matches!(err, ParseError::MalformedSource { .. }));

    // The capture fired before the failure still delivers.
    let mut delivered = Vec::new();
    while let Some(parsed) = rx.recv().await {
        delivered.push(parsed.name.clone());
    }
    assert_eq!(delivered, vec!["a.yaml"]);
}

#[tokio::test]
async fn test_captures_are_bounded() {
    let mut fs = MemoryFs::new(ROOT);
    for i in 0..6 {
        fs = fs.with_file(&format!("part{i}.yaml"), NOUN_YAML);
    }
    let parser: LexicalParser = fs.into_parser(1);
    let files = parser.load_files(Path::new(ROOT)).await;

    // With a single permit each capture must hand its file over before the
    // next one is spawned.
    let (tx, mut rx) = mpsc::channel(1);
    let reader = tokio::spawn(async move {
        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        count
    });

    let mut batch = parser.parse_files_into(Path::new(ROOT), &files, tx).await.unwrap();
    batch.join_captures().await;
    drop(batch);

    assert_eq!(reader.await.unwrap(), 6);
}
