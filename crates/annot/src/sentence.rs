//! Sentences: spans plus their tokens.

use crate::span::{HasSpan, Span};
use crate::token::Token;

/// Sentence-level attributes written by the smoking-status branch.
#[derive(Debug, Clone, Default)]
pub struct SentenceAttributes {
    pub smoking_status: String,
}

/// A detected sentence. Tokens are attached by the tokenizer and kept sorted
/// by begin; every token span lies inside the sentence span.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub span: Span,
    pub tokens: Vec<Token>,
    pub attributes: SentenceAttributes,
}

impl Sentence {
    pub fn new(span: Span) -> Self {
        Sentence {
            span,
            tokens: Vec::new(),
            attributes: SentenceAttributes::default(),
        }
    }
}

impl HasSpan for Sentence {
    fn span(&self) -> &Span {
        &self.span
    }
}
