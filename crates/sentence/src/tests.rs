use std::collections::HashMap;

use ml::linear::CacheNode;
use ml::LinearModel;

use crate::SentenceDetector;

fn insert(root: &mut HashMap<String, CacheNode>, parts: &[&str], value: i64) {
    let node = root.entry(parts[0].to_string()).or_insert_with(|| CacheNode {
        value: -1,
        inner: HashMap::new(),
    });
    if parts.len() == 1 {
        node.value = value;
    } else {
        insert(&mut node.inner, &parts[1..], value);
    }
}

/// A hand-built model implementing the classic policy: open a sentence on
/// the first character after outside, stay inside, close on whitespace that
/// follows a period.
fn rule_model() -> LinearModel {
    let mut cache = HashMap::new();
    insert(&mut cache, &["Character", "Space", "true"], 2);
    insert(&mut cache, &["CharOffset", "-1", "Id", "."], 3);
    insert(&mut cache, &["PrevOutcome", "O"], 4);

    LinearModel {
        bias: -1.0,
        // Label order B, I, O; weights per feature index.
        w: vec![
            0.0, 1.0, 0.0, // always-on: weak inside
            0.0, 0.0, 0.5, // space: weak outside
            0.0, 0.0, 2.0, // previous char is '.': strong outside
            5.0, 0.0, 0.0, // previous outcome O: strong begin
        ],
        labels: vec![1, 2, 3],
        features_len: 4,
        features_cache: cache,
    }
}

fn detector() -> SentenceDetector {
    SentenceDetector::from_parts(rule_model(), HashMap::new())
}

#[test]
fn splits_on_period_boundaries() {
    let sents = detector().detect("no evidence of pneumonia. patient is stable.");
    assert_eq!(sents.len(), 2);
    assert_eq!(&*sents[0].span.text, "no evidence of pneumonia.");
    assert_eq!((sents[0].span.begin, sents[0].span.end), (0, 25));
    assert_eq!(&*sents[1].span.text, "patient is stable.");
    assert_eq!((sents[1].span.begin, sents[1].span.end), (26, 44));
}

#[test]
fn trims_surrounding_whitespace() {
    let sents = detector().detect("  hello there.  ");
    assert_eq!(sents.len(), 1);
    assert_eq!(&*sents[0].span.text, "hello there.");
    assert_eq!((sents[0].span.begin, sents[0].span.end), (2, 14));
}

#[test]
fn empty_text_detects_nothing() {
    assert!(detector().detect("").is_empty());
}

#[test]
fn text_without_terminator_flushes_trailing_sentence() {
    let sents = detector().detect("sodium was 138 mmol/L");
    assert_eq!(sents.len(), 1);
    assert_eq!(&*sents[0].span.text, "sodium was 138 mmol/L");
}

#[test]
fn random_colon_after_newline_opens_fresh_sentence() {
    let sents = detector().detect("ab.\n:cd.");
    assert_eq!(sents.len(), 2);
    assert_eq!(&*sents[0].span.text, "ab.");
    assert_eq!(&*sents[1].span.text, ":cd.");
    assert_eq!((sents[1].span.begin, sents[1].span.end), (4, 8));
}

#[test]
fn sentence_text_matches_span_slice() {
    let text = "first sentence. second one here. third.";
    for sent in detector().detect(text) {
        let slice: String = text
            .chars()
            .skip(sent.span.begin as usize)
            .take((sent.span.end - sent.span.begin) as usize)
            .collect();
        assert_eq!(&*sent.span.text, slice.as_str());
    }
}

mod assembly {
    use super::*;
    use crate::{build_sentence, push_candidate};

    #[test]
    fn build_sentence_trims_and_rejects_empty() {
        let text = "  ab  ";
        let (sent, offset) = build_sentence(text, 0, 0, 6, 6).expect("sentence");
        assert_eq!(&*sent.span.text, "ab");
        assert_eq!((sent.span.begin, sent.span.end), (2, 4));
        assert_eq!(offset, 2);

        assert!(build_sentence("    ", 0, 0, 4, 4).is_none());
    }

    #[test]
    fn overlapping_candidates_merge_into_union() {
        let text = "abcdefghij";
        let mut out = Vec::new();
        let mut pending = None;

        let first = build_sentence(text, 0, 0, 6, 6).expect("first");
        push_candidate(&mut out, &mut pending, first, text);

        // Overlaps the first (begins before its end).
        let second = build_sentence(text, 4, 4, 10, 10).expect("second");
        push_candidate(&mut out, &mut pending, second, text);

        assert!(out.is_empty(), "merged candidate must not flush the first");
        let (merged, _) = pending.expect("pending");
        assert_eq!((merged.span.begin, merged.span.end), (0, 10));
        assert_eq!(&*merged.span.text, "abcdefghij");
    }

    #[test]
    fn disjoint_candidates_flush_in_order() {
        let text = "ab cd";
        let mut out = Vec::new();
        let mut pending = None;

        let first = build_sentence(text, 0, 0, 2, 2).expect("first");
        push_candidate(&mut out, &mut pending, first, text);
        let second = build_sentence(text, 3, 3, 5, 5).expect("second");
        push_candidate(&mut out, &mut pending, second, text);

        assert_eq!(out.len(), 1);
        assert_eq!(&*out[0].span.text, "ab");
        assert_eq!(&*pending.expect("pending").0.span.text, "cd");
    }
}
