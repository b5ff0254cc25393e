//! Rule-based KNOWN/UNKNOWN filter.

use std::collections::HashSet;

use annot::{Sentence, StringPrefixTree};

use crate::{CLASS_KNOWN, CLASS_UNKNOWN};

/// KNOWN when a smoking keyword appears and no "unknown" phrase dominates
/// the sentence (matched as a token sequence against a prefix tree).
pub struct RuleBasedClassifier {
    smoking_words: HashSet<String>,
    unknown_phrases: StringPrefixTree,
}

impl RuleBasedClassifier {
    pub fn new(smoking_words: HashSet<String>, unknown_words: &[String]) -> Self {
        let mut unknown_phrases = StringPrefixTree::new();
        for phrase in unknown_words {
            let phrase = phrase.trim().to_lowercase();
            let tokens: Vec<&str> = phrase.split(' ').collect();
            unknown_phrases.insert(&tokens, &phrase);
        }
        RuleBasedClassifier {
            smoking_words,
            unknown_phrases,
        }
    }

    pub fn classify(&self, sentence: &Sentence) -> &'static str {
        let mut class = CLASS_UNKNOWN;
        for token in &sentence.tokens {
            if self.smoking_words.contains(&token.span.text.to_lowercase()) {
                class = CLASS_KNOWN;
                break;
            }
        }
        if class != CLASS_KNOWN {
            return class;
        }

        let mut cursor = self.unknown_phrases.root();
        for token in &sentence.tokens {
            cursor = match self.unknown_phrases.step(cursor, &token.span.text) {
                Some(next) => next,
                None => self.unknown_phrases.root(),
            };
            if self.unknown_phrases.terminal(cursor).is_some() {
                return CLASS_UNKNOWN;
            }
        }
        CLASS_KNOWN
    }
}
