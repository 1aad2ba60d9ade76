//! Normalization Tests
//!
//! Synset entries flattened into word rows.

use std::collections::BTreeMap;

use rstest::rstest;

use crate::lexicon::{flatten_file, Examples, LexicalEntry, ParsedFile, PartOfSpeech};

fn file(entries: Vec<LexicalEntry>) -> ParsedFile {
    ParsedFile {
        name: "test.yaml".to_string(),
        entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn test_one_word_per_member() {
    let mut entry = LexicalEntry::new(
        "00003552-s",
        &["emergent", "emerging"],
        PartOfSpeech::AdjectiveSatellite,
        &["coming into existence"],
    );
    entry.identifier = Some("i10".to_string());
    entry.examples = Some(Examples::One("an emergent republic".to_string()));

    let words = entry.words();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].word, "emergent");
    assert_eq!(words[1].word, "emerging");
    for word in &words {
        assert_eq!(word.part_of_speech, PartOfSpeech::AdjectiveSatellite);
        assert_eq!(word.definitions, vec!["coming into existence"]);
        assert_eq!(word.entry_code.as_deref(), Some("i10"));
        assert_eq!(word.examples.as_ref().map(Examples::len), Some(1));
        assert!(!word.explicit);
    }
}

#[test]
fn test_members_are_trimmed_and_blanks_dropped() {
    let entry = LexicalEntry::new("1", &["  rural ", "", "   "], PartOfSpeech::Adjective, &["x"]);

    let words = entry.words();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word, "rural");
}

#[test]
fn test_explicit_carries_onto_words() {
    let mut entry = LexicalEntry::new("1", &["damn"], PartOfSpeech::Verb, &["wish harm upon"]);
    entry.explicit = true;

    assert!(entry.words().iter().all(|w| w.explicit));
}

#[test]
fn test_flatten_skips_entries_without_members() {
    let parsed = file(vec![
        LexicalEntry::new("00000002-n", &["entity"], PartOfSpeech::Noun, &["that which exists"]),
        LexicalEntry::new("00000001-n", &[], PartOfSpeech::Noun, &["placeholder"]),
        LexicalEntry::new("00000003-n", &[" "], PartOfSpeech::Noun, &["blank"]),
    ]);

    let batches: Vec<_> = flatten_file(&parsed).collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].word, "entity");
}

#[test]
fn test_flatten_follows_synset_order() {
    let parsed = file(vec![
        LexicalEntry::new("00000002-n", &["second"], PartOfSpeech::Noun, &["b"]),
        LexicalEntry::new("00000001-n", &["first"], PartOfSpeech::Noun, &["a"]),
    ]);

    let words: Vec<String> = flatten_file(&parsed)
        .flatten()
        .map(|w| w.word)
        .collect();
    assert_eq!(words, vec!["first", "second"]);
}

#[test]
fn test_glosses_skip_blanks() {
    let entry = LexicalEntry::new("1", &["run"], PartOfSpeech::Verb, &[" move fast ", "", "flee"]);
    let word = &entry.words()[0];

    let glosses: Vec<&str> = word.glosses().collect();
    assert_eq!(glosses, vec!["move fast", "flee"]);
}

// =============================================================================
// Part of Speech
// =============================================================================

#[rstest]
#[case("a", PartOfSpeech::Adjective)]
#[case("adjective", PartOfSpeech::Adjective)]
#[case("s", PartOfSpeech::AdjectiveSatellite)]
#[case("Satellite", PartOfSpeech::AdjectiveSatellite)]
#[case("r", PartOfSpeech::Adverb)]
#[case("adv", PartOfSpeech::Adverb)]
#[case("N", PartOfSpeech::Noun)]
#[case(" verb ", PartOfSpeech::Verb)]
#[case("*", PartOfSpeech::Any)]
#[case("any", PartOfSpeech::Any)]
fn test_part_of_speech_parsing(#[case] input: &str, #[case] expected: PartOfSpeech) {
    assert_eq!(input.parse::<PartOfSpeech>().unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("x")]
#[case("nouns")]
fn test_part_of_speech_rejects(#[case] input: &str) {
    assert!(input.parse::<PartOfSpeech>().is_err());
}

#[test]
fn test_part_of_speech_codes() {
    let codes: Vec<&str> = PartOfSpeech::CONCRETE.iter().map(|p| p.code()).collect();
    assert_eq!(codes, vec!["a", "s", "r", "n", "v"]);
    assert_eq!(PartOfSpeech::AdjectiveSatellite.label(), "adjective");
    assert_eq!(PartOfSpeech::filter_code(Some(PartOfSpeech::Any)), None);
    assert_eq!(PartOfSpeech::filter_code(Some(PartOfSpeech::Verb)), Some("v"));
    assert_eq!(PartOfSpeech::filter_code(None), None);
}
