//! Closed word sets for the negation machines.

use std::collections::HashSet;
use std::sync::Arc;

use fsm::conditions::set_of;

pub(crate) fn modal_verbs() -> Arc<HashSet<String>> {
    set_of(&["can", "ca", "will", "must", "could", "would", "should", "shall", "did"])
}

pub(crate) fn neg_particles() -> Arc<HashSet<String>> {
    set_of(&["not", "n't", "'t"])
}

pub(crate) fn neg_col_part() -> Arc<HashSet<String>> {
    set_of(&["out"])
}

pub(crate) fn neg_colloc() -> Arc<HashSet<String>> {
    set_of(&["rule", "rules", "ruled", "ruling", "rule-out"])
}

pub(crate) fn reg_verbs() -> Arc<HashSet<String>> {
    set_of(&[
        "reveal", "reveals", "revealed", "revealing", "have", "had", "has", "feel", "feels",
        "felt", "feeling", "complain", "complains", "complained", "complaining", "demonstrate",
        "demonstrates", "demonstrated", "demonstrating", "appear", "appears", "appeared",
        "appearing", "caused", "cause", "causing", "causes", "find", "finds", "found",
        "discover", "discovered", "discovers",
    ])
}

pub(crate) fn neg_verbs() -> Arc<HashSet<String>> {
    set_of(&[
        "deny", "denies", "denied", "denying", "fail", "fails", "failed", "failing", "decline",
        "declines", "declined", "declining", "exclude", "excludes", "excluding", "excluded",
    ])
}

pub(crate) fn neg_prepositions() -> Arc<HashSet<String>> {
    set_of(&["without", "absent", "none"])
}

pub(crate) fn neg_determiners() -> Arc<HashSet<String>> {
    set_of(&["no", "any", "neither", "nor", "never"])
}

pub(crate) fn reg_nouns() -> Arc<HashSet<String>> {
    set_of(&[
        "evidence", "indication", "indications", "sign", "signs", "symptoms", "symptom", "sx",
        "dx", "diagnosis", "history", "hx", "findings",
    ])
}

pub(crate) fn neg_adjectives() -> Arc<HashSet<String>> {
    set_of(&["unremarkable", "unlikely", "negative", "no", "unclear"])
}

/// Boundary tokens that terminate a context window.
pub fn default_boundaries() -> HashSet<String> {
    [
        "but", "however", "nevertheless", "notwithstanding", "though", "although", "when", "how",
        "what", "which", "while", "since", "then", "i", "he", "she", "they", "we", ";", ".", ")",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
