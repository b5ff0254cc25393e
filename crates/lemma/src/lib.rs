//! Table-driven morphological analyser.
//!
//! Given `(form, POS)`: normalize the surface form (URLs, digit spans,
//! repeated punctuation), then try cardinal/ordinal markers, per-class
//! exception tables, suffix-rewrite base-form generation and the
//! abbreviation map, falling back to the normalized form.

mod normalize;
mod rules;

use std::path::Path;

use annot::{read_map, read_rule_list, read_set, ResourceError};
use thiserror::Error;

pub use normalize::Normalizer;
pub use rules::MorphologicalRules;

#[derive(Debug, Error)]
pub enum LemmaError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

// POS tag classes.
pub const NN: &str = "NN";
pub const PRP: &str = "PRP";
pub const WP: &str = "WP";
pub const VB: &str = "VB";
pub const JJ: &str = "JJ";
pub const RB: &str = "RB";
pub const WRB: &str = "WRB";

pub fn is_noun(pos: &str) -> bool {
    pos.starts_with(NN) || pos == PRP || pos == WP
}

pub fn is_verb(pos: &str) -> bool {
    pos.starts_with(VB)
}

pub fn is_adjective(pos: &str) -> bool {
    pos.starts_with(JJ)
}

pub fn is_adverb(pos: &str) -> bool {
    pos.starts_with(RB) || pos == WRB
}

/// The lemmatiser.
pub struct Lemmatizer {
    normalizer: Normalizer,
    rules: MorphologicalRules,
}

impl Lemmatizer {
    /// Load every table from the lemmatiser resource directory:
    /// `*_exc.bsv`, `*_rule.bsv`, `*_base.txt`, `abbr_rule.bsv`.
    pub fn load(res_path: &Path) -> Result<Self, LemmaError> {
        let rules = MorphologicalRules {
            noun_exc: read_map(&res_path.join("noun_exc.bsv"))?,
            verb_exc: read_map(&res_path.join("verb_exc.bsv"))?,
            adj_exc: read_map(&res_path.join("adj_exc.bsv"))?,
            adv_exc: read_map(&res_path.join("adv_exc.bsv"))?,
            noun_base: read_set(&res_path.join("noun_base.txt"))?,
            verb_base: read_set(&res_path.join("verb_base.txt"))?,
            adj_base: read_set(&res_path.join("adj_base.txt"))?,
            adv_base: read_set(&res_path.join("adv_base.txt"))?,
            ord_base: read_set(&res_path.join("ord_base.txt"))?,
            crd_base: read_set(&res_path.join("crd_base.txt"))?,
            noun_rule: read_rule_list(&res_path.join("noun_rule.bsv"))?,
            verb_rule: read_rule_list(&res_path.join("verb_rule.bsv"))?,
            adj_rule: read_rule_list(&res_path.join("adj_rule.bsv"))?,
            abbr_rule: read_map(&res_path.join("abbr_rule.bsv"))?,
        };
        Ok(Self::from_rules(rules))
    }

    pub fn from_rules(rules: MorphologicalRules) -> Self {
        Lemmatizer {
            normalizer: Normalizer::new(),
            rules,
        }
    }

    /// Lemma for `(form, pos)`.
    pub fn analyze(&self, form: &str, pos: &str) -> String {
        let form = self.normalizer.normalize_basic(form).to_lowercase();
        let pos = pos.to_uppercase();

        if let Some(number) = self.rules.number(&form, &pos) {
            return number;
        }
        if let Some(exception) = self.rules.exception(&form, &pos) {
            return exception;
        }
        if let Some(base) = self.rules.base(&form, &pos) {
            return base;
        }
        if let Some(abbreviation) = self.rules.abbreviation(&form, &pos) {
            return abbreviation;
        }
        form
    }
}
