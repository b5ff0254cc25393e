//! Maximum-entropy sentence detector.
//!
//! Classifies every character of the text as `B` (sentence begin), `I`
//! (inside) or `O` (outside) from token-context and character-window
//! features, then assembles sentence spans from the outcome transitions:
//! `O→B` opens, `B/I→O` closes. Trailing whitespace is trimmed, overlapping
//! candidates merge into one span, and a `:` straight after a newline forces
//! `O` so header runs cannot leak into a sentence.

pub mod features;

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use annot::{istr, Sentence, Span};
use ml::{LinearModel, MlError};
use thiserror::Error;
use tracing::info;

use features::{CharFeatures, FeatureBuilder, CHARACTER, CHAR_OFFSET, LEFT_DOTLESS, PREV_OUTCOME, RIGHT_LOWER, SUFFIX_TRUE, TOKEN};

pub const OUTCOME_B: &str = "B";
pub const OUTCOME_I: &str = "I";
pub const OUTCOME_O: &str = "O";

#[derive(Debug, Error)]
pub enum SentenceError {
    #[error(transparent)]
    Model(#[from] MlError),
    #[error("failed to read token counts {path}: {source}")]
    TokenCounts {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The detector: a linear model over per-character features plus a token
/// frequency table feeding the log-count features.
pub struct SentenceDetector {
    model: LinearModel,
    token_counts: HashMap<String, f64>,
}

fn load_token_counts(path: &Path) -> Result<HashMap<String, f64>, SentenceError> {
    let file = std::fs::File::open(path).map_err(|source| SentenceError::TokenCounts {
        path: path.display().to_string(),
        source,
    })?;
    let mut counts = HashMap::new();
    for line in std::io::BufReader::new(file).lines() {
        let line = line.map_err(|source| SentenceError::TokenCounts {
            path: path.display().to_string(),
            source,
        })?;
        let Some((token, count)) = line.split_once(':') else {
            continue;
        };
        if let Ok(count) = count.trim().parse::<i64>() {
            counts.insert(token.trim().to_string(), count as f64);
        }
    }
    Ok(counts)
}

impl SentenceDetector {
    /// Load `sent_detector_cache_model.json` and `tokenCounts.txt` from the
    /// resource directory.
    pub fn load(res_path: &Path) -> Result<Self, SentenceError> {
        let model = LinearModel::load(&res_path.join("sent_detector_cache_model.json"))?;
        let token_counts = load_token_counts(&res_path.join("tokenCounts.txt"))?;
        info!(
            tokens = token_counts.len(),
            "loaded sentence detector model"
        );
        Ok(SentenceDetector { model, token_counts })
    }

    pub fn from_parts(model: LinearModel, token_counts: HashMap<String, f64>) -> Self {
        SentenceDetector { model, token_counts }
    }

    fn outcome_of(&self, label: u8) -> &'static str {
        match label {
            1 => OUTCOME_B,
            2 => OUTCOME_I,
            _ => OUTCOME_O,
        }
    }

    fn log_count(&self, token: &str) -> i64 {
        match self.token_counts.get(token) {
            Some(count) if *count != 0.0 => count.ln().round() as i64,
            _ => 0,
        }
    }

    /// Detect sentences in `text`. Spans are rune-indexed; sentence text is
    /// the corresponding slice of the input.
    pub fn detect(&self, text: &str) -> Vec<Sentence> {
        let mut out = Vec::new();
        if text.is_empty() {
            return out;
        }

        let mut prev_outcome = OUTCOME_O;

        let mut start_rune = 0usize;
        let mut start_offset = 0usize;

        let mut next_token: (usize, usize) = (0, 0);
        let mut prev_token_text = String::new();
        let mut next_token_text = String::new();

        let mut token_features = FeatureBuilder::new(&self.model);
        let mut char_features = CharFeatures::new(&self.model);

        let mut rand_colon_start = false;

        let mut pending: Option<(Sentence, usize)> = None;

        let mut prev_char: Option<char> = None;
        let mut rune_index = 0usize;

        for (byte_offset, cur_char) in text.char_indices() {
            if byte_offset >= next_token.1 {
                let mut prev = next_token;
                if prev.1 == 0 {
                    prev.1 = text.chars().next().map(char::len_utf8).unwrap_or(1);
                }
                next_token = next_whitespace_token(text, byte_offset);

                prev_token_text = text.get(prev.0..prev.1).unwrap_or("").to_string();
                next_token_text = text.get(next_token.0..next_token.1).unwrap_or("").to_string();

                token_features.cleanup();
                token_features.append_token_features(&prev_token_text, &next_token_text);

                let right_lower = self.log_count(&next_token_text.to_lowercase());
                token_features.append(&[TOKEN, RIGHT_LOWER, &right_lower.to_string(), SUFFIX_TRUE]);

                let prev_dotless = prev_token_text.strip_suffix('.').unwrap_or(&prev_token_text);
                let left_dotless = self.log_count(prev_dotless);
                token_features.append(&[TOKEN, LEFT_DOTLESS, &left_dotless.to_string(), SUFFIX_TRUE]);
            }

            if prev_outcome != OUTCOME_O && (cur_char.is_numeric() || cur_char.is_alphabetic()) {
                prev_outcome = OUTCOME_I;
                prev_char = Some(cur_char);
                rune_index += 1;
                continue;
            }

            char_features.builder.cleanup();
            char_features.builder.merge(&token_features);
            char_features.append_char_features(cur_char, &[CHARACTER]);

            // Character window [-3 .. +3] around the cursor.
            char_features.append_char_features(cur_char, &[CHAR_OFFSET, features::char_offset_value(0)]);
            let mut left_edge = byte_offset;
            let mut right_edge = byte_offset + cur_char.len_utf8();
            for i in 1..=3 {
                if left_edge > 0 {
                    if let Some(prev) = text[..left_edge].chars().next_back() {
                        char_features
                            .append_char_features(prev, &[CHAR_OFFSET, features::char_offset_value(-i)]);
                        left_edge -= prev.len_utf8();
                    }
                }
                if right_edge < text.len() {
                    if let Some(next) = text[right_edge..].chars().next() {
                        char_features
                            .append_char_features(next, &[CHAR_OFFSET, features::char_offset_value(i)]);
                        right_edge += next.len_utf8();
                    }
                }
            }
            char_features.builder.append(&[PREV_OUTCOME, prev_outcome]);

            let mut outcome = self.outcome_of(self.model.predict(&char_features.builder.values()));

            let is_random_colon = cur_char == ':' && prev_char == Some('\n');
            if is_random_colon {
                outcome = OUTCOME_O;
                rand_colon_start = true;
            }

            if outcome == OUTCOME_B {
                if !rand_colon_start {
                    start_rune = rune_index;
                    start_offset = byte_offset;
                }
            } else if outcome == OUTCOME_O && (prev_outcome == OUTCOME_I || prev_outcome == OUTCOME_B) {
                if let Some(built) = build_sentence(text, start_rune, start_offset, rune_index, byte_offset) {
                    rand_colon_start = false;
                    push_candidate(&mut out, &mut pending, built, text);
                }
            }

            if is_random_colon {
                start_rune = rune_index;
                start_offset = byte_offset;
                rand_colon_start = true;
            }
            prev_outcome = outcome;
            prev_char = Some(cur_char);
            rune_index += 1;
        }

        if prev_outcome != OUTCOME_O {
            if let Some(built) = build_sentence(text, start_rune, start_offset, rune_index, text.len()) {
                push_candidate(&mut out, &mut pending, built, text);
            }
        }

        if let Some((sent, _)) = pending {
            out.push(sent);
        }
        out
    }
}

/// Trim whitespace off both ends of the candidate range, returning the
/// sentence plus its byte start when anything is left.
fn build_sentence(
    text: &str,
    start_rune: usize,
    start_offset: usize,
    end_rune: usize,
    end_offset: usize,
) -> Option<(Sentence, usize)> {
    let mut start_rune = start_rune;
    let mut start_offset = start_offset;
    let mut end_rune = end_rune;
    let mut end_offset = end_offset;

    while end_rune > start_rune {
        let Some(last) = text[..end_offset].chars().next_back() else {
            break;
        };
        if !last.is_whitespace() {
            break;
        }
        end_rune -= 1;
        end_offset -= last.len_utf8();
    }
    while start_rune < end_rune {
        let Some(first) = text[start_offset..].chars().next() else {
            break;
        };
        if !first.is_whitespace() {
            break;
        }
        start_rune += 1;
        start_offset += first.len_utf8();
    }
    if start_rune >= end_rune {
        return None;
    }

    let sent_text = &text[start_offset..end_offset];
    Some((
        Sentence::new(Span::new(start_rune as i32, end_rune as i32, istr(sent_text))),
        start_offset,
    ))
}

/// Queue a candidate, merging it with the pending one when they overlap.
fn push_candidate(
    out: &mut Vec<Sentence>,
    pending: &mut Option<(Sentence, usize)>,
    built: (Sentence, usize),
    text: &str,
) {
    let (mut sent, mut sent_offset) = built;
    if let Some((prev, prev_offset)) = pending.take() {
        if prev.span.end > sent.span.begin {
            // Overlap: extend the new sentence back to the previous begin.
            sent.span.begin = prev.span.begin;
            sent_offset = prev_offset;
            let end_offset = sent_offset + byte_len_of_runes(text, sent_offset, (sent.span.end - sent.span.begin) as usize);
            sent.span.text = istr(&text[sent_offset..end_offset]);
        } else {
            out.push(prev);
        }
    }
    *pending = Some((sent, sent_offset));
}

fn byte_len_of_runes(text: &str, from: usize, runes: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(runes)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len() - from)
}

/// Byte range of the next whitespace-delimited token at or after `offset`.
fn next_whitespace_token(text: &str, offset: usize) -> (usize, usize) {
    if text.is_empty() {
        return (0, 0);
    }
    let mut start = offset;
    for ch in text[offset..].chars() {
        if !ch.is_whitespace() {
            break;
        }
        start += ch.len_utf8();
    }
    let mut end = start;
    for ch in text[start..].chars() {
        if ch.is_whitespace() {
            break;
        }
        end += ch.len_utf8();
    }
    (start, end)
}

#[cfg(test)]
mod tests;
