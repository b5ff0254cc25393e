//! Feature builders for the sentence detector.
//!
//! Feature names are sequences of string parts resolved against the model's
//! trie cache; unknown names are silently dropped so the builders can stay
//! model-agnostic.

use std::collections::HashMap;

use ml::{FeatureValue, LinearModel};

// Feature name parts.
pub const CHARACTER: &str = "Character";
pub const CHAR_OFFSET: &str = "CharOffset";
pub const TOKEN: &str = "Token";

pub const TOKEN_PREV_IDENTITY: &str = "TokenPrevIdentity";
pub const TOKEN_NEXT_IDENTITY: &str = "TokenNextIdentity";
pub const TOKEN_PREV_LEN: &str = "TokenPrevLength";
pub const TOKEN_NEXT_LEN: &str = "TokenNextLength";

pub const TOKEN_CAPITALIZED: &str = "Tokencap";
pub const TOKEN_CONTEXT_CAT: &str = "TokenContextCat";
pub const LEFT_WORD_RIGHT_CAP: &str = "LeftWordRightCap";

pub const RIGHT_LOWER: &str = "RightLower";
pub const LEFT_DOTLESS: &str = "LeftDotless";

pub const PREV_OUTCOME: &str = "PrevOutcome";

pub const SUFFIX_ID: &str = "Id";
pub const SUFFIX_UPPER: &str = "Upper";
pub const SUFFIX_LOWER: &str = "Lower";
pub const SUFFIX_DIGIT: &str = "Digit";
pub const SUFFIX_SPACE: &str = "Space";

pub const SUFFIX_FALSE: &str = "false";
pub const SUFFIX_TRUE: &str = "true";

/// Builder accumulating active feature indices for one prediction.
pub struct FeatureBuilder<'m> {
    model: &'m LinearModel,
    prefix: Vec<String>,
    features: Vec<FeatureValue>,
}

impl<'m> FeatureBuilder<'m> {
    pub fn new(model: &'m LinearModel) -> Self {
        FeatureBuilder {
            model,
            prefix: Vec::new(),
            features: Vec::with_capacity(60),
        }
    }

    pub fn cleanup(&mut self) {
        self.prefix.clear();
        self.features.clear();
    }

    pub fn merge(&mut self, other: &FeatureBuilder<'_>) {
        self.features.extend_from_slice(&other.features);
    }

    pub fn set_prefix(&mut self, parts: &[&str]) {
        self.prefix = parts.iter().map(|p| p.to_string()).collect();
    }

    pub fn clear_prefix(&mut self) {
        self.prefix.clear();
    }

    pub fn append(&mut self, parts: &[&str]) {
        let mut full: Vec<&str> = self.prefix.iter().map(String::as_str).collect();
        full.extend_from_slice(parts);
        if let Some(index) = self.model.feature_index(&full) {
            self.features.push(FeatureValue { index, value: 1.0 });
        }
    }

    /// Finish the vector; index 1 is the always-on feature.
    pub fn values(&self) -> Vec<FeatureValue> {
        let mut out = self.features.clone();
        out.push(FeatureValue { index: 1, value: 1.0 });
        out
    }

    /// Identity, length, capitalization and context-category features for
    /// the whitespace tokens to the left and right of the cursor.
    pub fn append_token_features(&mut self, prev_token: &str, next_token: &str) {
        self.append(&[TOKEN_PREV_IDENTITY, prev_token]);

        if !next_token.is_empty() {
            self.append(&[TOKEN_NEXT_IDENTITY, next_token]);
        } else {
            self.append(&[TOKEN_NEXT_IDENTITY]);
        }
        self.append(&[TOKEN_NEXT_LEN, &next_token.len().to_string(), SUFFIX_TRUE]);
        self.append(&[TOKEN_PREV_LEN, &prev_token.len().to_string(), SUFFIX_TRUE]);

        let next_cap = next_token
            .chars()
            .next()
            .map(|ch| ch.is_uppercase())
            .unwrap_or(false);
        if next_cap {
            self.append(&[TOKEN_CAPITALIZED, SUFFIX_TRUE]);
            self.append(&[LEFT_WORD_RIGHT_CAP, prev_token, SUFFIX_TRUE]);
        } else {
            self.append(&[TOKEN_CAPITALIZED, SUFFIX_FALSE]);
            self.append(&[LEFT_WORD_RIGHT_CAP, prev_token, SUFFIX_FALSE]);
        }
        self.append(&[TOKEN_CONTEXT_CAT, prev_token, next_token]);
    }
}

/// Cached per-character properties: class booleans, a Unicode-category type
/// string and the identity (`<LF>` stands in for newline).
pub struct CharFeatures<'m> {
    pub builder: FeatureBuilder<'m>,
    cache: HashMap<char, CharProperties>,
}

#[derive(Clone)]
struct CharProperties {
    upper: bool,
    lower: bool,
    digit: bool,
    space: bool,
    type_str: &'static str,
    id: String,
}

impl<'m> CharFeatures<'m> {
    pub fn new(model: &'m LinearModel) -> Self {
        CharFeatures {
            builder: FeatureBuilder::new(model),
            cache: HashMap::new(),
        }
    }

    pub fn append_char_features(&mut self, ch: char, prefix: &[&str]) {
        let properties = self
            .cache
            .entry(ch)
            .or_insert_with(|| CharProperties::of(ch))
            .clone();
        self.builder.set_prefix(prefix);
        for (name, on) in [
            (SUFFIX_UPPER, properties.upper),
            (SUFFIX_LOWER, properties.lower),
            (SUFFIX_DIGIT, properties.digit),
            (SUFFIX_SPACE, properties.space),
        ] {
            self.builder
                .append(&[name, if on { SUFFIX_TRUE } else { SUFFIX_FALSE }]);
        }
        self.builder.append(&[properties.type_str, SUFFIX_TRUE]);
        self.builder.append(&[SUFFIX_ID, &properties.id]);
        self.builder.clear_prefix();
    }
}

impl CharProperties {
    fn of(ch: char) -> Self {
        CharProperties {
            upper: ch.is_uppercase(),
            lower: ch.is_lowercase(),
            digit: ch.is_numeric(),
            space: ch.is_whitespace(),
            type_str: char_type_string(ch),
            id: if ch == '\n' {
                "<LF>".to_string()
            } else {
                ch.to_string()
            },
        }
    }
}

/// Unicode general-category bucket as the trainer names them.
pub fn char_type_string(ch: char) -> &'static str {
    if ch.is_uppercase() {
        return "Type1";
    }
    if ch.is_lowercase() {
        return "Type2";
    }
    if ch.is_numeric() {
        return "Type9";
    }
    match ch {
        ' ' | '\u{a0}' => "Type12",
        '\n' | '\r' | '\t' | '\u{0}'..='\u{1f}' | '\u{7f}' => "Type15",
        '-' | '–' | '—' => "Type20",
        ')' | ']' | '}' => "Type22",
        '(' | '[' | '{' => "Type21",
        '+' | '<' | '=' | '>' | '|' | '~' | '¬' | '±' => "Type25",
        '_' => "Type23",
        '$' | '¢' | '£' | '¥' | '€' => "Type26",
        '^' | '`' | '¨' | '´' => "Type27",
        '!' | '"' | '#' | '%' | '&' | '\'' | '*' | ',' | '.' | '/' | ':' | ';' | '?' | '@'
        | '\\' | '·' | '¿' | '¡' => "Type24",
        _ => "Type0",
    }
}

/// Char-offset value names for the [-3..3] window.
pub fn char_offset_value(offset: i32) -> &'static str {
    match offset {
        -3 => "-3",
        -2 => "-2",
        -1 => "-1",
        0 => "0",
        1 => "1",
        2 => "2",
        3 => "3",
        _ => "0",
    }
}
