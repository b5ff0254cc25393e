//! Dictionary lookup against a UMLS-style term dictionary.
//!
//! The dictionary is indexed by *rare word*: every term is keyed by its
//! least-frequent lookup-eligible token, so a sentence is matched in one
//! pass — for each token, candidate terms are fetched by the token's text
//! or lemma and their full token sequences aligned around the rare-word
//! position. Matched spans resolve to concepts through the concept factory
//! and become annotations via the consumer (with the optional
//! precision-mode containment rule).

mod concepts;
mod consumer;
mod dictionary;
mod matcher;
mod rare_word;
mod semantic_groups;
mod term_tokenizer;

use thiserror::Error;

pub use concepts::{ConceptFactory, ConceptMap, SemanticConcepts};
pub use consumer::{create_preside_terms, Consumer};
pub use dictionary::Dictionary;
pub use matcher::{search_spans, LookupParams};
pub use rare_word::{build_rare_word_map, is_rarable_token, RareWordTerm};
pub use semantic_groups::{aspect_of, semantic_group_of};
pub use term_tokenizer::TermTokenizer;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Resource(#[from] annot::ResourceError),
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary scheme is missing required column {0}")]
    MissingColumn(&'static str),
    #[error("failed to serialize index cache: {0}")]
    Cache(#[from] serde_json::Error),
}
