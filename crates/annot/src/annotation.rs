//! Annotations: dictionary mentions plus their extracted attributes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::concept::Concept;
use crate::semantic::Semantic;
use crate::sentence::Sentence;
use crate::span::{HasSpan, Span};

/// Attribute value written by the attribute stages. Serialization shapes:
/// `Null` → `null`, `Text` → `"…"`, `Triple` → `["…", begin, end]`,
/// `EmptyList` → `[]`. Downstream consumers expect every contract key to be
/// present, so absence is expressed as `Null` or `EmptyList`, never by
/// omitting the key.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Text(String),
    Triple(String, i32, i32),
    EmptyList,
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Null => serializer.serialize_none(),
            AttrValue::Text(text) => serializer.serialize_str(text),
            AttrValue::Triple(text, begin, end) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(text)?;
                seq.serialize_element(begin)?;
                seq.serialize_element(end)?;
                seq.end()
            }
            AttrValue::EmptyList => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

/// Attribute map with deterministic key order (idempotent serialization).
pub type Attributes = BTreeMap<String, AttrValue>;

/// A mention produced by dictionary lookup and enriched by the attribute
/// stages. Holds a shared reference to its sentence so window-based stages
/// (drug attributes, polarity, lab values) can reach the tokens.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub span: Span,
    pub semantic: Semantic,
    pub concepts: Vec<Arc<Concept>>,
    pub sentence: Arc<Sentence>,
    pub attributes: Attributes,
}

impl Annotation {
    pub fn new(span: Span, semantic: Semantic, sentence: Arc<Sentence>) -> Self {
        Annotation {
            span,
            semantic,
            concepts: Vec::new(),
            sentence,
            attributes: Attributes::new(),
        }
    }

    /// Mention type name for the response payload.
    pub fn name(&self) -> &'static str {
        self.semantic.mention_name()
    }
}

impl HasSpan for Annotation {
    fn span(&self) -> &Span {
        &self.span
    }
}
