//! Clinical-text annotation pipeline.
//!
//! One request — `{tid, text}` — flows through a DAG of concurrent stages:
//! sentence detection, tokenization, POS tagging, lemmatisation, then a
//! fan-out into one branch per loaded configuration. The default-clinical
//! branch runs dictionary lookup and the attribute stages (lab values, drug
//! attributes, polarity) selected by the configuration's features; the
//! smoking-status branch runs the sentence adjuster and the smoking
//! classifier. A joiner collects exactly one result per branch into a
//! single JSON object keyed by configuration name.
//!
//! Per-sentence failures are logged and drop that sentence from the failing
//! stage's output; the request as a whole still completes with results from
//! sibling sentences and sibling configurations.
//!
//! The stage crates are re-exported here so applications can drive the
//! pipeline through a single dependency.

pub mod config;
pub mod pipeline;

use thiserror::Error;

pub use config::{load_configurations, Configuration};
pub use pipeline::{Pipeline, Request};

pub use annot::{Annotation, AttrValue, Concept, Polarity, Semantic, Sentence, Span, Token};
pub use drugner::DrugAttributesExtractor;
pub use lab::LabValuesExtractor;
pub use lookup::{ConceptFactory, Consumer, Dictionary};
pub use polarity::PolarityAnalyzer;
pub use sentence::SentenceDetector;
pub use smoking::SmokingStatusAnnotator;
pub use tokenizer::PtbTokenizer;

/// Failures surfaced by pipeline construction or request processing.
/// Startup failures (configuration and resource loading) are fatal; stage
/// errors never reach this type — they are logged at the stage boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read configuration {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no valid configuration found in {0}")]
    NoConfigurations(String),
    #[error("configuration {name}: {problem}")]
    BadConfiguration { name: String, problem: String },
    #[error(transparent)]
    SentenceDetector(#[from] sentence::SentenceError),
    #[error(transparent)]
    PosModel(#[from] pos::PosModelError),
    #[error(transparent)]
    Lemmatizer(#[from] lemma::LemmaError),
    #[error(transparent)]
    Lookup(#[from] lookup::LookupError),
    #[error(transparent)]
    Lab(#[from] lab::LabError),
    #[error(transparent)]
    Smoking(#[from] smoking::SmokingError),
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}
