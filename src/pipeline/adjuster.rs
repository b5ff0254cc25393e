//! Sentence adjuster for the smoking branch: a sentence ending in `:` is
//! merged with its successor when the successor opens with one of the
//! pattern words, so header-style lines like `tobacco: quit 1998` classify
//! as one sentence.

use annot::{istr, Sentence};

const WORDS_IN_PATTERN: [&str; 6] = ["no", "none", "never", "quit", "smoked", ":"];

fn merge_texts(prev: &str, current: &str, gap: i32) -> String {
    let mut merged = String::with_capacity(prev.len() + current.len() + gap.max(0) as usize);
    merged.push_str(prev);
    for _ in 0..gap.max(0) {
        merged.push(' ');
    }
    merged.push_str(current);
    merged
}

fn opens_with_pattern_word(text: &str) -> bool {
    WORDS_IN_PATTERN.iter().any(|word| text.starts_with(word))
}

/// Adjust a begin-sorted sentence list.
pub fn adjust_sentences(sentences: Vec<Sentence>) -> Vec<Sentence> {
    let mut out = Vec::with_capacity(sentences.len());
    let mut pending: Option<Sentence> = None;

    for current in sentences {
        let Some(mut prev) = pending.take() else {
            pending = Some(current);
            continue;
        };

        if !prev.span.text.ends_with(':') {
            out.push(prev);
            pending = Some(current);
            continue;
        }

        if opens_with_pattern_word(&current.span.text) {
            let gap = current.span.begin - prev.span.end;
            prev.span.text = istr(&merge_texts(&prev.span.text, &current.span.text, gap));
            prev.span.end = current.span.end;
            prev.tokens.extend(current.tokens);
            out.push(prev);
            pending = None;
        } else {
            out.push(prev);
            pending = Some(current);
        }
    }

    if let Some(prev) = pending {
        out.push(prev);
    }
    out
}
