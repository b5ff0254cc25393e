//! Smoking status classification.
//!
//! Per sentence: a rule-based filter decides KNOWN vs UNKNOWN; KNOWN
//! sentences go to the PCS SVM over unigram/bigram keywords plus a date
//! feature; phrase-level negation can override to NON_SMOKER. A
//! document-level resolver aggregates the per-sentence labels.

mod annotator;
mod pcs;
mod resolver;
mod rule_based;

use std::collections::HashSet;
use std::path::Path;

use annot::{read_list, read_set, ResourceError};
use ml::{MlError, SvmModel};
use thiserror::Error;

pub use annotator::{search_phrase_occurrences, SmokingStatusAnnotator};
pub use pcs::PcsClassifier;
pub use resolver::DocumentSmokingResolver;
pub use rule_based::RuleBasedClassifier;

pub const CLASS_PAST_SMOKER: &str = "PAST_SMOKER";
pub const CLASS_CURRENT_SMOKER: &str = "CURRENT_SMOKER";
pub const CLASS_SMOKER: &str = "SMOKER";
pub const CLASS_NON_SMOKER: &str = "NON_SMOKER";
pub const CLASS_UNKNOWN: &str = "UNKNOWN";
pub const CLASS_KNOWN: &str = "KNOWN";

// The PCS model's label contract. The label set is not validated at load;
// anything outside 1..=3 resolves to UNKNOWN.
pub const CLASS_CURRENT_SMOKER_INT: i32 = 1;
pub const CLASS_PAST_SMOKER_INT: i32 = 2;
pub const CLASS_SMOKER_INT: i32 = 3;

#[derive(Debug, Error)]
pub enum SmokingError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Model(#[from] MlError),
}

/// Everything the smoking branch loads from the resource directory.
pub struct SmokingParams {
    pub smoking_words: HashSet<String>,
    pub unknown_words: Vec<String>,
    pub stop_words: HashSet<String>,
    pub go_words: Vec<String>,
    pub model: SvmModel,
    pub smoker_phrases: Vec<String>,
    pub non_smoker_phrases: Vec<String>,
    pub negation_contradiction_words: HashSet<String>,
    pub boundaries: HashSet<String>,
}

impl SmokingParams {
    /// Load from `<res_path>/smoking`: KU keyword lists, PCS model and
    /// word lists, smoker/non-smoker phrase dictionaries, context lists.
    pub fn load(res_path: &Path) -> Result<Self, SmokingError> {
        let smoking = res_path.join("smoking");
        Ok(SmokingParams {
            smoking_words: read_set(&smoking.join("KU").join("keywords.txt"))?,
            unknown_words: read_list(&smoking.join("KU").join("unknown_words.txt"))?,
            stop_words: read_set(&smoking.join("PCS").join("stopwords_PCS.txt"))?,
            go_words: read_list(&smoking.join("PCS").join("keywords_PCS.txt"))?,
            model: SvmModel::load(&smoking.join("PCS").join("pcs_libsvm.model.json"))?,
            smoker_phrases: read_list(&smoking.join("smoker.dictionary"))?,
            non_smoker_phrases: read_list(&smoking.join("nonsmoker.dictionary"))?,
            negation_contradiction_words: read_set(
                &smoking.join("context").join("negationContradictionWords.txt"),
            )?,
            boundaries: read_set(&smoking.join("context").join("boundaryData.txt"))?,
        })
    }
}
