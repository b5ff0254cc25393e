//! The PCS (past/current/smoker) SVM classifier.

use std::collections::HashSet;

use annot::Sentence;
use ml::{SvmModel, SvmNode};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    CLASS_CURRENT_SMOKER, CLASS_CURRENT_SMOKER_INT, CLASS_PAST_SMOKER, CLASS_PAST_SMOKER_INT,
    CLASS_SMOKER, CLASS_SMOKER_INT, CLASS_UNKNOWN,
};

static DASH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new("-{2,}").unwrap());
static SENT_SYMBOLS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[.?!:;()',"{}<>#+]"#).unwrap());
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"19\d\d",
        r"19\d\ds",
        r"20\d\d",
        r"20\d\ds",
        r"[1-9]0s",
        r"\d{1,2}[/-]\d{1,2}",
        r"\d{1,2}[/-]\d{4}",
        r"\d{1,2}[/-]\d{1,2}[/-]\d{2}",
        r"\d{1,2}[/-]\d{1,2}[/-]\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub struct PcsClassifier {
    stop_words: HashSet<String>,
    go_words: Vec<String>,
    model: SvmModel,
}

impl PcsClassifier {
    pub fn new(stop_words: HashSet<String>, go_words: Vec<String>, model: SvmModel) -> Self {
        PcsClassifier {
            stop_words,
            go_words,
            model,
        }
    }

    /// Classify one KNOWN sentence into CURRENT_SMOKER / PAST_SMOKER /
    /// SMOKER (or UNKNOWN for any other model label).
    pub fn classify(&self, sentence: &Sentence) -> &'static str {
        let mut unigrams: Vec<String> = Vec::new();
        for token in &sentence.tokens {
            if !token.is_word {
                continue;
            }
            let text = token.span.text.trim().to_lowercase();
            let text = DASH_SPLIT.replace_all(&text, " ");
            for piece in text.split(' ') {
                if !self.stop_words.contains(piece) {
                    unigrams.push(piece.to_string());
                }
            }
        }

        let mut bigrams: Vec<String> = Vec::with_capacity(unigrams.len().saturating_sub(1));
        for pair in unigrams.windows(2) {
            bigrams.push(format!("{}_{}", pair[0], pair[1]));
        }

        let mut features: Vec<f64> = Vec::with_capacity(self.go_words.len() + 1);
        for keyword in &self.go_words {
            let grams = if keyword.contains('_') { &bigrams } else { &unigrams };
            let hit = grams.iter().any(|gram| gram.eq_ignore_ascii_case(keyword));
            features.push(if hit { 1.0 } else { 0.0 });
        }

        let stripped = SENT_SYMBOLS.replace_all(&sentence.span.text, " ");
        let has_date = stripped
            .split_whitespace()
            .any(|piece| DATE_PATTERNS.iter().any(|pattern| pattern.is_match(piece)));
        features.push(if has_date { 1.0 } else { 0.0 });

        let x: Vec<SvmNode> = features
            .iter()
            .enumerate()
            .map(|(idx, value)| SvmNode {
                index: idx as i32 + 1,
                value: *value,
            })
            .collect();

        match self.model.predict(&x) {
            CLASS_CURRENT_SMOKER_INT => CLASS_CURRENT_SMOKER,
            CLASS_PAST_SMOKER_INT => CLASS_PAST_SMOKER,
            CLASS_SMOKER_INT => CLASS_SMOKER,
            _ => CLASS_UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::{istr, Span, Token};
    use ml::svm::{SvmParameter, KERNEL_LINEAR, SVM_TYPE_C_SVC};

    fn word(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        let mut token = Token::new(Span::new(begin, end, istr(text)));
        token.is_word = true;
        token
    }

    fn sentence(text: &str, tokens: Vec<Token>) -> Sentence {
        let mut sent = Sentence::new(Span::new(0, text.chars().count() as i32, istr(text)));
        sent.tokens = tokens;
        sent
    }

    fn node(index: i32, value: f64) -> SvmNode {
        SvmNode { index, value }
    }

    /// Keywords: ["quit", "smokes"] + date feature. Two separating planes
    /// vote between labels 1 (current), 2 (past), 3 (smoker):
    /// "smokes" → current, "quit" → past, neither keyword → smoker.
    fn classifier() -> PcsClassifier {
        let model = SvmModel {
            param: SvmParameter {
                svm_type: SVM_TYPE_C_SVC,
                kernel_type: KERNEL_LINEAR,
                ..Default::default()
            },
            nr_class: 3,
            l: 3,
            // One support vector per class: quit-axis, smokes-axis, neither.
            sv: vec![
                vec![node(2, 1.0)],            // current: smokes
                vec![node(1, 1.0)],            // past: quit
                vec![node(1, -1.0), node(2, -1.0)], // smoker: neither
            ],
            sv_coef: vec![vec![2.0, -2.0, 0.0], vec![2.0, 0.0, -2.0]],
            rho: vec![0.0, 0.0, 0.0],
            label: vec![1, 2, 3],
            nsv: vec![1, 1, 1],
        };
        PcsClassifier::new(
            HashSet::new(),
            vec!["quit".to_string(), "smokes".to_string()],
            model,
        )
    }

    #[test]
    fn keyword_vector_drives_the_label() {
        let current = sentence(
            "patient smokes daily",
            vec![word("patient", 0), word("smokes", 8), word("daily", 15)],
        );
        assert_eq!(classifier().classify(&current), CLASS_CURRENT_SMOKER);

        let past = sentence(
            "patient quit smoking",
            vec![word("patient", 0), word("quit", 8), word("smoking", 13)],
        );
        assert_eq!(classifier().classify(&past), CLASS_PAST_SMOKER);
    }

    #[test]
    fn date_regexes_detect_year_like_forms() {
        for text in ["1998", "1990s", "2004", "80s", "5/12", "10/15/94", "3/2004"] {
            assert!(
                DATE_PATTERNS.iter().any(|p| p.is_match(text)),
                "{text} should look like a date"
            );
        }
        assert!(!DATE_PATTERNS.iter().any(|p| p.is_match("hello")));
    }

    #[test]
    fn stop_words_drop_out_of_the_grams() {
        let mut classifier = classifier();
        classifier.stop_words.insert("patient".to_string());
        let sent = sentence(
            "patient quit",
            vec![word("patient", 0), word("quit", 8)],
        );
        // Still past: "quit" survives the stopword filter.
        assert_eq!(classifier.classify(&sent), CLASS_PAST_SMOKER);
    }
}
