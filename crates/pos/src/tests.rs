use std::collections::HashMap;

use annot::{istr, Span, Token};

use crate::model::{Context, EvalParameters, PosModel};
use crate::{SequenceValidator, Tagger};

fn word(text: &str, begin: i32) -> Token {
    let end = begin + text.chars().count() as i32;
    let mut token = Token::new(Span::new(begin, end, istr(text)));
    token.is_word = true;
    token
}

/// Model with outcomes NN/VB/DT driven by `w=` predicates, plus a weak
/// `t=DT` predicate nudging the following word towards NN.
fn lexical_model() -> PosModel {
    let mut pmap: HashMap<String, usize> = HashMap::new();
    pmap.insert("w=the".into(), 0);
    pmap.insert("w=dog".into(), 1);
    pmap.insert("w=barks".into(), 2);
    pmap.insert("t=DT".into(), 3);

    PosModel {
        probs: vec![0.0, 0.0, 0.0],
        outcomes: vec!["NN".into(), "VB".into(), "DT".into()],
        predicate_map: pmap,
        eval_params: EvalParameters {
            params: vec![
                Context { outcomes: vec![2], parameters: vec![4.0] },
                Context { outcomes: vec![0], parameters: vec![4.0] },
                Context { outcomes: vec![1], parameters: vec![4.0] },
                Context { outcomes: vec![0], parameters: vec![0.5] },
            ],
            num_of_outcomes: 3,
        },
    }
}

#[test]
fn tags_follow_lexical_evidence() {
    let tokens = [word("the", 0), word("dog", 4), word("barks", 8)];
    let refs: Vec<&Token> = tokens.iter().collect();
    let tagger = Tagger::new(lexical_model());

    let tags = tagger.tag(&refs);
    assert_eq!(tags, vec!["DT", "NN", "VB"]);
}

#[test]
fn unknown_words_still_get_a_tag() {
    let tokens = [word("zzz", 0)];
    let refs: Vec<&Token> = tokens.iter().collect();
    let tags = Tagger::new(lexical_model()).tag(&refs);
    assert_eq!(tags.len(), 1);
    assert!(["NN", "VB", "DT"].contains(&tags[0].as_str()));
}

#[test]
fn empty_sequence_tags_empty() {
    let refs: Vec<&Token> = Vec::new();
    let tags = Tagger::new(lexical_model()).tag(&refs);
    assert!(tags.is_empty());
}

#[test]
fn validator_restricts_listed_words() {
    let tokens = [word("the", 0)];
    let refs: Vec<&Token> = tokens.iter().collect();

    let mut dictionary = HashMap::new();
    dictionary.insert(
        "the".to_string(),
        ["VB".to_string()].into_iter().collect::<std::collections::HashSet<_>>(),
    );
    let validator = SequenceValidator::with_dictionary(dictionary);
    assert!(validator.valid(0, &refs, "VB"));
    assert!(!validator.valid(0, &refs, "DT"));
    // Unlisted words accept anything.
    let other = [word("dog", 0)];
    let other_refs: Vec<&Token> = other.iter().collect();
    assert!(validator.valid(0, &other_refs, "DT"));
}
