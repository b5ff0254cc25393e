//! Rare-word terms: dictionary entries keyed by their least-frequent
//! lookup-eligible token.

use std::collections::HashSet;
use std::sync::Arc;

use annot::IStr;
use fxhash::FxHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One dictionary term: interned tokens, the raw text length, its CUI and
/// the index of the rare word within `tokens`.
#[derive(Debug, Clone)]
pub struct RareWordTerm {
    pub tokens: Vec<IStr>,
    pub text_length: u32,
    pub cui: IStr,
    pub rare_word_index: usize,
}

impl RareWordTerm {
    pub fn rare_word(&self) -> &IStr {
        &self.tokens[self.rare_word_index]
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Serialized shape of a term in the index cache. Field names are the cache
/// format contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct RareWordTermRecord {
    #[serde(rename = "Tokens")]
    pub tokens: Vec<String>,
    #[serde(rename = "TextLength")]
    pub text_length: u32,
    #[serde(rename = "CUI")]
    pub cui: String,
    #[serde(rename = "RareWordIndex")]
    pub rare_word_index: usize,
}

impl From<&RareWordTerm> for RareWordTermRecord {
    fn from(term: &RareWordTerm) -> Self {
        RareWordTermRecord {
            tokens: term.tokens.iter().map(|t| t.to_string()).collect(),
            text_length: term.text_length,
            cui: term.cui.to_string(),
            rare_word_index: term.rare_word_index,
        }
    }
}

static STOP_TERMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "across", "after", "against", "all", "along", "and", "any", "around", "at",
        "away", "back", "before", "behind", "below", "beneath", "beside", "besides", "between",
        "beyond", "both", "but", "by", "can", "concerning", "could", "down", "during", "eight",
        "except", "five", "for", "forward", "four", "from", "half", "he", "hers", "his", "how",
        "however", "i", "in", "inside", "into", "it", "its", "like", "may", "might", "mine",
        "must", "my", "near", "nine", "none", "nor", "of", "off", "on", "one", "or", "our",
        "ours", "out", "outside", "over", "past", "seven", "she", "should", "since", "six", "so",
        "some", "ten", "that", "the", "theirs", "there", "these", "this", "those", "three",
        "through", "throughout", "to", "toward", "twice", "two", "under", "until", "up", "upon",
        "what", "whatever", "when", "whenever", "where", "wherever", "which", "whichever", "who",
        "whoever", "whom", "whomever", "will", "with", "without", "would", "yet", "you", "yours",
        "zero",
    ]
    .into_iter()
    .collect()
});

static HAS_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new("[a-zA-Z]+").unwrap());

/// Whether a token may carry a term in the rare-word index: more than one
/// rune, at least one letter, and not a stop term.
pub fn is_rarable_token(token: &str) -> bool {
    if token.len() <= 1 {
        return false;
    }
    if !HAS_LETTER.is_match(token) {
        return false;
    }
    !STOP_TERMS.contains(token)
}

/// Build the rare-word index: count eligible tokens across all terms, pick
/// each multi-token term's least-frequent eligible token, and group terms by
/// that token.
pub fn build_rare_word_map(mut terms: Vec<RareWordTerm>) -> FxHashMap<IStr, Vec<Arc<RareWordTerm>>> {
    let mut counts: FxHashMap<IStr, usize> = FxHashMap::default();
    for term in &terms {
        for token in &term.tokens {
            if is_rarable_token(token) {
                *counts.entry(Arc::clone(token)).or_insert(0) += 1;
            }
        }
    }

    for term in terms.iter_mut() {
        fill_rare_word(term, &counts);
    }

    let mut map: FxHashMap<IStr, Vec<Arc<RareWordTerm>>> = FxHashMap::default();
    for term in terms {
        let key = Arc::clone(term.rare_word());
        map.entry(key).or_default().push(Arc::new(term));
    }
    map
}

fn fill_rare_word(term: &mut RareWordTerm, counts: &FxHashMap<IStr, usize>) {
    if term.tokens.len() <= 1 {
        return;
    }
    let mut rare_index = 0usize;
    let mut min_count = usize::MAX;
    for (i, token) in term.tokens.iter().enumerate() {
        let Some(count) = counts.get(token) else {
            continue;
        };
        if *count < min_count {
            min_count = *count;
            rare_index = i;
        }
    }
    term.rare_word_index = rare_index;
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::intern;

    fn term(tokens: &[&str], cui: &str) -> RareWordTerm {
        RareWordTerm {
            tokens: tokens.iter().map(|t| intern(t)).collect(),
            text_length: tokens.join(" ").len() as u32,
            cui: intern(cui),
            rare_word_index: 0,
        }
    }

    #[test]
    fn eligibility_rules() {
        assert!(is_rarable_token("cancer"));
        assert!(!is_rarable_token("x"));
        assert!(!is_rarable_token("42"));
        assert!(!is_rarable_token("the"));
        assert!(is_rarable_token("b12"));
    }

    #[test]
    fn least_frequent_token_is_chosen() {
        let terms = vec![
            term(&["lung", "cancer"], "c1"),
            term(&["lung", "disease"], "c2"),
            term(&["lung", "transplant"], "c3"),
        ];
        let map = build_rare_word_map(terms);

        // "lung" appears three times, the tails once each: every term keys
        // on its tail.
        assert!(map.contains_key(&intern("cancer")));
        assert!(map.contains_key(&intern("disease")));
        assert!(map.contains_key(&intern("transplant")));
        assert!(!map.contains_key(&intern("lung")));

        let hit = &map[&intern("cancer")][0];
        assert_eq!(hit.rare_word_index, 1);
        assert_eq!(&*hit.cui, "c1");
    }

    #[test]
    fn single_token_terms_keep_index_zero() {
        let map = build_rare_word_map(vec![term(&["aspirin"], "c1")]);
        let hit = &map[&intern("aspirin")][0];
        assert_eq!(hit.rare_word_index, 0);
        assert_eq!(hit.token_count(), 1);
    }

    #[test]
    fn index_build_is_deterministic() {
        let build = || {
            build_rare_word_map(vec![
                term(&["lung", "cancer"], "c1"),
                term(&["cancer"], "c2"),
                term(&["small", "cell", "lung", "cancer"], "c3"),
            ])
        };
        let a = build();
        let b = build();
        assert_eq!(a.len(), b.len());
        for (key, terms) in &a {
            let other = &b[key];
            assert_eq!(terms.len(), other.len());
            for (x, y) in terms.iter().zip(other.iter()) {
                assert_eq!(x.rare_word_index, y.rare_word_index);
                assert_eq!(x.cui, y.cui);
            }
        }
    }
}
