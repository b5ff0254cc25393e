use std::sync::Arc;

use annot::{istr, Annotation, Polarity, Scope, Semantic, Sentence, Span, Token};

use crate::{default_boundaries, PolarityAnalyzer, PolarityFsm};

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

fn analyzer() -> PolarityAnalyzer {
    PolarityAnalyzer::new(20, 10, default_boundaries())
}

fn annotation(sent: &Arc<Sentence>, begin: i32, end: i32, text: &str) -> Annotation {
    Annotation::new(Span::new(begin, end, istr(text)), Semantic::Disorder, Arc::clone(sent))
}

fn polarity_of(text: &str, tokens: Vec<Token>, begin: i32, end: i32, mention: &str) -> Polarity {
    let sent = sentence(text, tokens);
    let ann = annotation(&sent, begin, end, mention);
    analyzer()
        .analyze(&[ann], &[Scope::Left, Scope::Right])
        .expect("analyze")[0]
}

#[test]
fn no_evidence_of_is_negative() {
    // "no evidence of pneumonia ."
    let polarity = polarity_of(
        "no evidence of pneumonia.",
        vec![
            word("no", 0),
            word("evidence", 3),
            word("of", 12),
            word("pneumonia", 15),
            {
                let mut dot = word(".", 24);
                dot.is_word = false;
                dot.is_punct = true;
                dot
            },
        ],
        15,
        24,
        "pneumonia",
    );
    assert_eq!(polarity, Polarity::Negative);
}

#[test]
fn plain_mention_is_positive() {
    let polarity = polarity_of(
        "patient has pneumonia",
        vec![word("patient", 0), word("has", 8), word("pneumonia", 12)],
        12,
        21,
        "pneumonia",
    );
    assert_eq!(polarity, Polarity::Positive);
}

#[test]
fn prefixing_no_flips_polarity() {
    // The round-trip law: "no " before the subject flips the mention.
    let positive = polarity_of(
        "fever today",
        vec![word("fever", 0), word("today", 6)],
        0,
        5,
        "fever",
    );
    assert_eq!(positive, Polarity::Positive);

    let negative = polarity_of(
        "no fever today",
        vec![word("no", 0), word("fever", 3), word("today", 9)],
        3,
        8,
        "fever",
    );
    assert_eq!(negative, Polarity::Negative);
}

#[test]
fn denies_negates_from_the_left() {
    let polarity = polarity_of(
        "patient denies chest pain",
        vec![
            word("patient", 0),
            word("denies", 8),
            word("chest", 15),
            word("pain", 21),
        ],
        15,
        25,
        "chest pain",
    );
    assert_eq!(polarity, Polarity::Negative);
}

#[test]
fn rule_out_collocation_negates() {
    let polarity = polarity_of(
        "rule out pneumonia",
        vec![word("rule", 0), word("out", 5), word("pneumonia", 9)],
        9,
        18,
        "pneumonia",
    );
    assert_eq!(polarity, Polarity::Negative);
}

#[test]
fn boundary_stops_the_window() {
    // The negation sits beyond a boundary token (";"): out of scope.
    let mut semi = word(";", 9);
    semi.is_word = false;
    semi.is_punct = true;
    let polarity = polarity_of(
        "no nausea ; pneumonia",
        vec![
            word("no", 0),
            word("nausea", 3),
            semi,
            word("pneumonia", 12),
        ],
        12,
        21,
        "pneumonia",
    );
    assert_eq!(polarity, Polarity::Positive);
}

#[test]
fn right_scope_detects_following_negation() {
    // "pneumonia was not seen"
    let polarity = polarity_of(
        "pneumonia was not seen",
        vec![
            word("pneumonia", 0),
            word("was", 10),
            word("not", 14),
            word("seen", 18),
        ],
        0,
        9,
        "pneumonia",
    );
    assert_eq!(polarity, Polarity::Negative);
}

#[test]
fn window_machines_see_eos() {
    // A trailing negation particle right before <EOS> still fires.
    let fsm = PolarityFsm::new();
    let tokens = vec![word("not", 0)];
    let mut window: Vec<&Token> = tokens.iter().collect();
    let eos = Token::new(Span::new(0, 0, istr("<EOS>")));
    window.push(&eos);
    assert!(fsm.negated(&window).expect("fsm"));
}
