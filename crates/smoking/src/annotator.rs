//! Sentence-level smoking status assignment: rule filter → PCS → negation
//! adjustment.

use std::collections::HashSet;
use std::sync::Arc;

use annot::{istr, Annotation, Polarity, Scope, Semantic, Sentence, Span};
use once_cell::sync::Lazy;
use polarity::PolarityAnalyzer;
use regex::Regex;
use tracing::warn;

use crate::pcs::PcsClassifier;
use crate::rule_based::RuleBasedClassifier;
use crate::{SmokingParams, CLASS_KNOWN, CLASS_NON_SMOKER, CLASS_UNKNOWN};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\W]").unwrap());

const PHRASE_SCOPE_SIZE: usize = 7;

pub struct SmokingStatusAnnotator {
    rule_based: RuleBasedClassifier,
    pcs: PcsClassifier,
    analyzer: PolarityAnalyzer,
    smoker_phrases: Vec<String>,
    non_smoker_phrases: Vec<String>,
    contradiction_words: HashSet<String>,
}

impl SmokingStatusAnnotator {
    pub fn new(params: SmokingParams) -> Self {
        SmokingStatusAnnotator {
            rule_based: RuleBasedClassifier::new(params.smoking_words, &params.unknown_words),
            pcs: PcsClassifier::new(params.stop_words, params.go_words, params.model),
            analyzer: PolarityAnalyzer::new(
                PHRASE_SCOPE_SIZE,
                PHRASE_SCOPE_SIZE,
                params.boundaries,
            ),
            smoker_phrases: params.smoker_phrases,
            non_smoker_phrases: params.non_smoker_phrases,
            contradiction_words: params.negation_contradiction_words,
        }
    }

    /// Final per-sentence classification.
    pub fn classify(&self, sentence: &Arc<Sentence>) -> String {
        if self.rule_based.classify(sentence) != CLASS_KNOWN {
            return CLASS_UNKNOWN.to_string();
        }

        let pcs_result = self.pcs.classify(sentence);

        let smoker_mentions = search_phrase_occurrences(sentence, &self.smoker_phrases);
        let negated = match self
            .analyzer
            .analyze(&smoker_mentions, &[Scope::Left, Scope::Right])
        {
            Ok(polarities) => polarities
                .iter()
                .filter(|polarity| **polarity == Polarity::Negative)
                .count(),
            Err(error) => {
                warn!(%error, "smoker phrase polarity failed");
                0
            }
        };

        let non_smoker_mentions = search_phrase_occurrences(sentence, &self.non_smoker_phrases);
        let contradictions = self.contradiction_count(sentence);

        if (negated > 0 && contradictions == 0) || !non_smoker_mentions.is_empty() {
            CLASS_NON_SMOKER.to_string()
        } else {
            pcs_result.to_string()
        }
    }

    fn contradiction_count(&self, sentence: &Sentence) -> usize {
        let mut count = 0;
        for token in &sentence.tokens {
            let cleaned = NON_WORD.replace_all(&token.span.text, " ");
            for piece in cleaned.trim().split(' ') {
                if self.contradiction_words.contains(piece) {
                    count += 1;
                }
            }
        }
        count
    }
}

/// All occurrences of the dictionary phrases in the sentence text,
/// scanned left to right, as annotations anchored to the sentence.
pub fn search_phrase_occurrences(sentence: &Arc<Sentence>, phrases: &[String]) -> Vec<Annotation> {
    let mut found = Vec::new();
    let text = sentence.span.text.to_lowercase();

    for phrase in phrases {
        if phrase.is_empty() {
            continue;
        }
        let phrase_runes = phrase.chars().count() as i32;
        let mut search_start = 0usize;

        while let Some(position) = text[search_start..].find(phrase.as_str()) {
            let byte_offset = search_start + position;
            let rune_offset = text[..byte_offset].chars().count() as i32;
            let begin = sentence.span.begin + rune_offset;
            found.push(Annotation::new(
                Span::new(begin, begin + phrase_runes, istr(phrase)),
                Semantic::Unknown,
                Arc::clone(sentence),
            ));
            search_start = byte_offset + phrase.len();
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::Token;
    use ml::svm::{SvmModel, SvmNode, SvmParameter, KERNEL_LINEAR, SVM_TYPE_C_SVC};

    fn word(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        let mut token = Token::new(Span::new(begin, end, istr(text)));
        token.is_word = true;
        token
    }

    fn sentence(text: &str, tokens: Vec<Token>) -> Arc<Sentence> {
        let mut sent = Sentence::new(Span::new(0, text.chars().count() as i32, istr(text)));
        sent.tokens = tokens;
        Arc::new(sent)
    }

    fn node(index: i32, value: f64) -> SvmNode {
        SvmNode { index, value }
    }

    /// Two-keyword model: "quit" → PAST_SMOKER (2), "smokes" → CURRENT (1),
    /// neither → SMOKER (3).
    fn params() -> SmokingParams {
        let model = SvmModel {
            param: SvmParameter {
                svm_type: SVM_TYPE_C_SVC,
                kernel_type: KERNEL_LINEAR,
                ..Default::default()
            },
            nr_class: 3,
            l: 3,
            sv: vec![
                vec![node(2, 1.0)],
                vec![node(1, 1.0)],
                vec![node(1, -1.0), node(2, -1.0)],
            ],
            sv_coef: vec![vec![2.0, -2.0, 0.0], vec![2.0, 0.0, -2.0]],
            rho: vec![0.0, 0.0, 0.0],
            label: vec![1, 2, 3],
            nsv: vec![1, 1, 1],
        };
        SmokingParams {
            smoking_words: ["smoking", "smoker", "smokes", "non-smoker"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unknown_words: Vec::new(),
            stop_words: HashSet::new(),
            go_words: vec!["quit".to_string(), "smokes".to_string()],
            model,
            smoker_phrases: vec!["smoker".to_string()],
            non_smoker_phrases: vec!["non-smoker".to_string()],
            negation_contradiction_words: HashSet::new(),
            boundaries: polarity::default_boundaries(),
        }
    }

    fn annotator() -> SmokingStatusAnnotator {
        SmokingStatusAnnotator::new(params())
    }

    #[test]
    fn quit_smoking_classifies_past() {
        let sent = sentence(
            "patient quit smoking in 1998.",
            vec![
                word("patient", 0),
                word("quit", 8),
                word("smoking", 13),
                word("in", 21),
                word("1998", 24),
            ],
        );
        assert_eq!(annotator().classify(&sent), "PAST_SMOKER");
    }

    #[test]
    fn non_smoker_phrase_overrides() {
        let sent = sentence(
            "patient is a non-smoker.",
            vec![
                word("patient", 0),
                word("is", 8),
                word("a", 11),
                word("non-smoker", 13),
            ],
        );
        assert_eq!(annotator().classify(&sent), CLASS_NON_SMOKER);
    }

    #[test]
    fn negated_smoker_phrase_overrides() {
        let sent = sentence(
            "patient is not a smoker",
            vec![
                word("patient", 0),
                word("is", 8),
                word("not", 11),
                word("a", 15),
                word("smoker", 17),
            ],
        );
        assert_eq!(annotator().classify(&sent), CLASS_NON_SMOKER);
    }

    #[test]
    fn no_keyword_is_unknown() {
        let sent = sentence(
            "patient feels well",
            vec![word("patient", 0), word("feels", 8), word("well", 14)],
        );
        assert_eq!(annotator().classify(&sent), CLASS_UNKNOWN);
    }

    #[test]
    fn phrase_occurrences_use_rune_offsets() {
        let sent = sentence("a smoker here", vec![word("a", 0), word("smoker", 2)]);
        let found = search_phrase_occurrences(&sent, &["smoker".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].span.begin, found[0].span.end), (2, 8));
    }
}
