//! Core data model for the clinical annotation pipeline.
//!
//! Everything downstream of the raw request text is expressed in terms of the
//! types defined here: rune-indexed [`Span`]s, [`Token`]s with class flags and
//! shape strings, [`Sentence`]s, dictionary [`Concept`]s grouped by
//! [`Semantic`], and [`Annotation`]s tying a span back to its sentence and
//! concepts.
//!
//! Offsets are always rune positions (code-point indices) into the containing
//! text; begin is inclusive, end is exclusive. Byte offsets never cross a
//! stage boundary.
//!
//! The crate also hosts the process-wide [`interner`]: a string store that is
//! written to during dictionary loading and then sealed, after which lookups
//! still return the canonical `Arc<str>` (so pointer comparison against
//! interned dictionary tokens stays valid) but fresh strings are no longer
//! retained.

pub mod annotation;
pub mod concept;
pub mod interner;
pub mod prefix_tree;
pub mod resource;
pub mod semantic;
pub mod sentence;
pub mod span;
pub mod token;

pub use annotation::{Annotation, AttrValue, Attributes};
pub use concept::{scheme, Concept, ConceptCodes};
pub use interner::{intern, istr, seal_interner, IStr};
pub use prefix_tree::{CharPrefixTree, StringPrefixTree};
pub use resource::{read_list, read_map, read_rule_list, read_set, BsvReader, ResourceError};
pub use semantic::Semantic;
pub use sentence::{Sentence, SentenceAttributes};
pub use span::{spans_cover, HasSpan, Span};
pub use token::{shape_of, Token};

/// Positive / negative modality of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn name(self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

/// Which side of a mention a context window covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Left,
    Right,
}
