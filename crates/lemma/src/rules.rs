//! Morphological rule tables.

use std::collections::{HashMap, HashSet};

use crate::{is_adjective, is_adverb, is_noun, is_verb};

/// Exception maps, base-form sets, suffix-rewrite rules and the
/// abbreviation map, one bundle per lemmatiser instance.
#[derive(Debug, Default)]
pub struct MorphologicalRules {
    pub noun_exc: HashMap<String, String>,
    pub verb_exc: HashMap<String, String>,
    pub adj_exc: HashMap<String, String>,
    pub adv_exc: HashMap<String, String>,

    pub noun_base: HashSet<String>,
    pub verb_base: HashSet<String>,
    pub adj_base: HashSet<String>,
    pub adv_base: HashSet<String>,
    pub ord_base: HashSet<String>,
    pub crd_base: HashSet<String>,

    pub noun_rule: Vec<(String, String)>,
    pub verb_rule: Vec<(String, String)>,
    pub adj_rule: Vec<(String, String)>,
    pub abbr_rule: HashMap<String, String>,
}

impl MorphologicalRules {
    /// `#crd#` / `#ord#` markers for cardinal forms.
    pub fn number(&self, form: &str, pos: &str) -> Option<String> {
        if pos != "CD" {
            return None;
        }
        if self.crd_base.contains(form) {
            return Some("#crd#".to_string());
        }
        if self.ord_base.contains(form) || matches!(form, "0st" | "0nd" | "0rd" | "0th") {
            return Some("#ord#".to_string());
        }
        None
    }

    pub fn exception(&self, form: &str, pos: &str) -> Option<String> {
        let table = if is_noun(pos) {
            &self.noun_exc
        } else if is_verb(pos) {
            &self.verb_exc
        } else if is_adjective(pos) {
            &self.adj_exc
        } else if is_adverb(pos) {
            &self.adv_exc
        } else {
            return None;
        };
        table.get(form).cloned()
    }

    pub fn base(&self, form: &str, pos: &str) -> Option<String> {
        if is_noun(pos) {
            base_aux(form, &self.noun_base, &self.noun_rule)
        } else if is_verb(pos) {
            base_aux(form, &self.verb_base, &self.verb_rule)
        } else if is_adjective(pos) {
            base_aux(form, &self.adj_base, &self.adj_rule)
        } else {
            None
        }
    }

    pub fn abbreviation(&self, form: &str, pos: &str) -> Option<String> {
        self.abbr_rule.get(&format!("{form}_{pos}")).cloned()
    }
}

fn base_aux(form: &str, set: &HashSet<String>, rules: &[(String, String)]) -> Option<String> {
    for (suffix, replacement) in rules {
        if let Some(stem) = form.strip_suffix(suffix.as_str()) {
            let base = format!("{stem}{replacement}");
            if set.contains(&base) {
                return Some(base);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_rules_apply_in_declaration_order() {
        let set: HashSet<String> = ["body", "bods"].iter().map(|s| s.to_string()).collect();
        let rules = vec![
            ("ies".to_string(), "y".to_string()),
            ("s".to_string(), "s".to_string()),
        ];
        // "ies" rule fires first and its output is in the set.
        assert_eq!(base_aux("bodies", &set, &rules), Some("body".to_string()));
    }

    #[test]
    fn digit_ordinals_match_normalized_forms() {
        let rules = MorphologicalRules::default();
        assert_eq!(rules.number("0th", "CD"), Some("#ord#".to_string()));
        assert_eq!(rules.number("0th", "NN"), None);
    }
}
