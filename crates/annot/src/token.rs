//! Tokens and shape strings.

use crate::interner::IStr;
use crate::span::{HasSpan, Span};

/// A single token inside a sentence. Flags classify the first rune class of
/// the token; `shape` holds one class character per rune of the text
/// (`d` digit, `X` upper, `x` anything else). The tokenizer lowercases
/// sentence text before scanning, so `shape` is also how the original casing
/// survives.
#[derive(Debug, Clone)]
pub struct Token {
    pub span: Span,
    pub tag: Option<IStr>,
    pub lemma: Option<IStr>,
    pub is_word: bool,
    pub is_number: bool,
    pub is_punct: bool,
    pub is_symbol: bool,
    pub is_newline: bool,
    pub shape: String,
}

impl Token {
    pub fn new(span: Span) -> Self {
        let shape = shape_of(&span.text);
        Token {
            span,
            tag: None,
            lemma: None,
            is_word: false,
            is_number: false,
            is_punct: false,
            is_symbol: false,
            is_newline: false,
            shape,
        }
    }

    /// Token text with the original upper-case positions restored from the
    /// shape string. Falls back to the stored text when the shape is shorter
    /// than the text.
    pub fn shaped_text(&self) -> String {
        let runes: Vec<char> = self.span.text.chars().collect();
        let shape = self.shape.as_bytes();
        if runes.len() > shape.len() {
            return self.span.text.to_string();
        }
        runes
            .iter()
            .enumerate()
            .flat_map(|(i, ch)| {
                if shape[i] == b'X' {
                    ch.to_uppercase().collect::<Vec<char>>()
                } else {
                    vec![*ch]
                }
            })
            .collect()
    }
}

impl HasSpan for Token {
    fn span(&self) -> &Span {
        &self.span
    }
}

/// Per-rune class string: `d` for digits, `X` for upper-case letters, `x`
/// for everything else.
pub fn shape_of(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_ascii_digit() || ch.is_numeric() {
                'd'
            } else if ch.is_uppercase() {
                'X'
            } else {
                'x'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::istr;

    #[test]
    fn shape_classifies_runes() {
        assert_eq!(shape_of("Mg2"), "Xxd");
        assert_eq!(shape_of("aBc-9"), "xXxxd");
    }

    #[test]
    fn shaped_text_restores_upper_positions() {
        let mut token = Token::new(Span::new(0, 3, istr("mg2")));
        token.shape = "Xxd".into();
        assert_eq!(token.shaped_text(), "Mg2");
    }

    #[test]
    fn shaped_text_falls_back_on_short_shape() {
        let mut token = Token::new(Span::new(0, 4, istr("long")));
        token.shape = "xx".into();
        assert_eq!(token.shaped_text(), "long");
    }
}
