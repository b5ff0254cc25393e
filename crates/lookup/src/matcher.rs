//! Per-sentence dictionary matching.

use std::collections::HashMap;
use std::sync::Arc;

use annot::{istr, IStr, Sentence, Span, Token};

use crate::dictionary::Dictionary;
use crate::rare_word::RareWordTerm;

/// Matching knobs from the configuration.
#[derive(Debug, Clone)]
pub struct LookupParams {
    pub minimum_lookup_span: u32,
    pub exclusion_tags: Vec<String>,
}

impl Default for LookupParams {
    fn default() -> Self {
        LookupParams {
            minimum_lookup_span: 1,
            exclusion_tags: vec!["VB".to_string()],
        }
    }
}

fn is_non_lookup_token(token: &Token, params: &LookupParams) -> bool {
    if token.is_newline || token.is_punct {
        return true;
    }
    let Some(tag) = &token.tag else {
        return false;
    };
    params
        .exclusion_tags
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(tag))
}

fn istr_matches(expected: &IStr, token: &Token) -> bool {
    if let Some(lemma) = &token.lemma {
        if Arc::ptr_eq(expected, lemma) {
            return true;
        }
    }
    Arc::ptr_eq(expected, &token.span.text)
}

fn is_term_match(term: &RareWordTerm, tokens: &[Token], begin_idx: usize, end_idx: usize) -> bool {
    let mut hit = 0usize;
    for token in &tokens[begin_idx..=end_idx] {
        if token.is_newline {
            continue;
        }
        if hit >= term.tokens.len() {
            return false;
        }
        if istr_matches(&term.tokens[hit], token) {
            hit += 1;
            continue;
        }
        return false;
    }
    true
}

/// Scan one sentence against the dictionary. Returns the matched spans and
/// the set of CUIs per span, in first-hit order.
pub fn search_spans(
    sentence: &Sentence,
    dictionary: &Dictionary,
    params: &LookupParams,
) -> (Vec<Span>, Vec<Vec<IStr>>) {
    let tokens = &sentence.tokens;
    let non_newline: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_newline)
        .map(|(i, _)| i)
        .collect();

    let sentence_runes: Vec<char> = sentence.span.text.chars().collect();

    let mut spans: Vec<Span> = Vec::new();
    let mut cuis: Vec<Vec<IStr>> = Vec::new();
    let mut index: HashMap<(i32, i32), usize> = HashMap::new();

    let mut record = |span: Span, cui: &IStr, spans: &mut Vec<Span>, cuis: &mut Vec<Vec<IStr>>| {
        let key = (span.begin, span.end);
        let slot = *index.entry(key).or_insert_with(|| {
            spans.push(span);
            cuis.push(Vec::new());
            spans.len() - 1
        });
        if !cuis[slot].iter().any(|have| Arc::ptr_eq(have, cui)) {
            cuis[slot].push(Arc::clone(cui));
        }
    };

    for (idx, lookup_index) in non_newline.iter().enumerate() {
        let lookup_token = &tokens[*lookup_index];
        if is_non_lookup_token(lookup_token, params) {
            continue;
        }

        let mut words: Vec<IStr> = Vec::with_capacity(2);
        words.push(Arc::clone(&lookup_token.span.text));
        if let Some(lemma) = &lookup_token.lemma {
            if !Arc::ptr_eq(&lookup_token.span.text, lemma) {
                words.push(Arc::clone(lemma));
            }
        }

        for hit in dictionary.candidates(&words) {
            if hit.text_length < params.minimum_lookup_span {
                continue;
            }

            if hit.tokens.len() == 1 {
                record(lookup_token.span.clone(), &hit.cui, &mut spans, &mut cuis);
                continue;
            }

            let Some(lookup_start) = idx.checked_sub(hit.rare_word_index) else {
                continue;
            };
            if lookup_start + hit.token_count() > non_newline.len() {
                continue;
            }
            let lookup_end = lookup_start + hit.token_count() - 1;

            let term_start = non_newline[lookup_start];
            let term_end = non_newline[lookup_end];

            if is_term_match(hit, tokens, term_start, term_end) {
                let span_begin = tokens[term_start].span.begin;
                let span_end = tokens[term_end].span.end;
                let local_begin = (span_begin - sentence.span.begin) as usize;
                let local_end = (span_end - sentence.span.begin) as usize;
                if local_end > sentence_runes.len() {
                    continue;
                }
                let text: String = sentence_runes[local_begin..local_end].iter().collect();
                let span = Span::new(span_begin, span_end, istr(&text));
                record(span, &hit.cui, &mut spans, &mut cuis);
            }
        }
    }

    (spans, cuis)
}
