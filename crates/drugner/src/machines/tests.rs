use std::sync::Arc;

use annot::{istr, Annotation, AttrValue, Semantic, Sentence, Span, Token};

use crate::extractor::{
    DrugAttributesExtractor, PARAM_MED_DOSAGE, PARAM_MED_FREQUENCY_NUMBER,
    PARAM_MED_FREQUENCY_UNIT, PARAM_MED_ROUTE, PARAM_MED_STATUS_CHANGE, PARAM_MED_STRENGTH_NUM,
    PARAM_MED_STRENGTH_UNIT,
};
use crate::machines::FsmBattery;
use crate::params::{word_set, DrugFsmParams};
use crate::tokens::OutKind;

fn word(text: &str, begin: i32) -> Token {
    let end = begin + text.chars().count() as i32;
    let mut token = Token::new(Span::new(begin, end, istr(text)));
    token.is_word = true;
    token
}

fn number(text: &str, begin: i32) -> Token {
    let mut token = word(text, begin);
    token.is_word = false;
    token.is_number = true;
    token
}

fn punct(text: &str, begin: i32) -> Token {
    let mut token = word(text, begin);
    token.is_word = false;
    token.is_punct = true;
    token
}

fn sentence(text: &str, tokens: Vec<Token>) -> Sentence {
    let mut sent = Sentence::new(Span::new(0, text.chars().count() as i32, istr(text)));
    sent.tokens = tokens;
    sent
}

/// Inline parameter bundle covering the vocabulary the tests exercise.
fn params() -> DrugFsmParams {
    let mut params = DrugFsmParams::default();
    params.strength_unit.full_text_set = word_set(&["mg", "ml"]);
    params.route.single_oral_word_set = word_set(&["po", "orally"]);
    params.frequency_unit.daily_word_set = word_set(&["daily"]);
    params.frequency_unit.prn_word_set = word_set(&["prn"]);
    params.form.full_text_set = word_set(&["tablet", "capsule"]);
    params.dosage.solo_text_set = word_set(&["bolus"]);
    params.time.day_night_set = word_set(&["pm", "am"]);
    params
}

fn aspirin_sentence() -> Sentence {
    // "pt takes aspirin 81 mg po daily."
    sentence(
        "pt takes aspirin 81 mg po daily.",
        vec![
            word("pt", 0),
            word("takes", 3),
            word("aspirin", 9),
            number("81", 17),
            word("mg", 20),
            word("po", 23),
            word("daily", 26),
            punct(".", 31),
        ],
    )
}

#[test]
fn battery_finds_strength_route_and_frequency_unit() {
    let battery = FsmBattery::new(&params());
    let results = battery.execute(&aspirin_sentence()).expect("execute");

    assert_eq!(results.strength_units.len(), 1);
    let unit = &results.strength_units[0];
    assert_eq!((unit.span.begin, unit.span.end), (20, 22));
    assert_eq!(&*unit.span.text, "mg");

    assert_eq!(results.strengths.len(), 1);
    let strength = &results.strengths[0];
    assert_eq!((strength.span.begin, strength.span.end), (17, 19));
    assert_eq!(&*strength.span.text, "81");

    assert_eq!(results.routes.len(), 1);
    assert!(matches!(
        results.routes[0].kind,
        OutKind::Route(crate::tokens::FormMethod::Oral)
    ));

    assert_eq!(results.frequency_units.len(), 1);
    let freq_unit = &results.frequency_units[0];
    assert_eq!(&*freq_unit.span.text, "daily");
    assert!(matches!(
        freq_unit.kind,
        OutKind::FrequencyUnit(crate::tokens::FrequencyQuantity::One)
    ));
}

#[test]
fn combined_unit_token_becomes_strength() {
    // "take 25mg daily": the fused token is both unit and strength.
    let sent = sentence(
        "take 25mg daily",
        vec![word("take", 0), word("25mg", 5), word("daily", 10)],
    );
    let battery = FsmBattery::new(&params());
    let results = battery.execute(&sent).expect("execute");

    assert_eq!(results.strength_units.len(), 1);
    assert!(matches!(
        results.strength_units[0].kind,
        OutKind::StrengthUnitCombined
    ));
    assert_eq!(results.strengths.len(), 1);
    assert_eq!(&*results.strengths[0].span.text, "25mg");
}

#[test]
fn range_strength_spans_the_dash() {
    let sent = sentence(
        "give 250 - 300 ml",
        vec![
            word("give", 0),
            number("250", 5),
            punct("-", 9),
            number("300", 11),
            word("ml", 15),
        ],
    );
    let battery = FsmBattery::new(&params());
    let results = battery.execute(&sent).expect("execute");

    assert_eq!(results.ranges.len(), 1);
    let range = &results.ranges[0];
    assert_eq!((range.span.begin, range.span.end), (5, 14));
    assert_eq!(&*range.span.text, "250 - 300");

    // The range masks its raw tokens inside the unit machine, so the unit
    // still resolves cleanly after it.
    assert_eq!(results.strength_units.len(), 1);
    assert_eq!(&*results.strength_units[0].span.text, "ml");
    assert!(results.strengths.is_empty());
}

#[test]
fn fraction_machine_matches_slash_forms() {
    let sent = sentence(
        "take 1 / 2 tablet",
        vec![
            word("take", 0),
            number("1", 5),
            punct("/", 7),
            number("2", 9),
            word("tablet", 11),
        ],
    );
    let battery = FsmBattery::new(&params());
    let results = battery.execute(&sent).expect("execute");

    assert!(!results.fractions.is_empty());
    let fraction = &results.fractions[0];
    assert_eq!((fraction.span.begin, fraction.span.end), (5, 10));

    // "tablet" is a form.
    assert_eq!(results.forms.len(), 1);
    assert_eq!(&*results.forms[0].span.text, "tablet");
}

#[test]
fn time_machine_reads_clock_and_halfday() {
    let sent = sentence(
        "at 4 pm give",
        vec![word("at", 0), number("4", 3), word("pm", 5), word("give", 8)],
    );
    let battery = FsmBattery::new(&params());
    let results = battery.execute(&sent).expect("execute");
    assert_eq!(results.times.len(), 1);
    assert_eq!(&*results.times[0].span.text, "4 pm");
}

#[test]
fn extractor_writes_the_full_attribute_contract() {
    let sent = Arc::new(aspirin_sentence());
    let mut annotations = vec![Annotation::new(
        Span::new(9, 16, istr("aspirin")),
        Semantic::Drug,
        Arc::clone(&sent),
    )];

    let extractor = DrugAttributesExtractor::new(10, &params());
    extractor.extract(&mut annotations).expect("extract");

    let attrs = &annotations[0].attributes;
    for key in crate::extractor::MED_ATTRIBUTE_KEYS {
        assert!(attrs.contains_key(key), "missing attribute {key}");
    }

    assert_eq!(
        attrs[PARAM_MED_STRENGTH_NUM],
        AttrValue::Triple("81".into(), 17, 19)
    );
    assert_eq!(
        attrs[PARAM_MED_STRENGTH_UNIT],
        AttrValue::Triple("mg".into(), 20, 22)
    );
    assert_eq!(attrs[PARAM_MED_ROUTE], AttrValue::Text("Enteral_Oral".into()));
    assert_eq!(
        attrs[PARAM_MED_FREQUENCY_UNIT],
        AttrValue::Triple("daily".into(), 26, 31)
    );
    // No explicit frequency number: the unit quantity stands in.
    assert_eq!(
        attrs[PARAM_MED_FREQUENCY_NUMBER],
        AttrValue::Triple("1.0".into(), 26, 31)
    );
    assert_eq!(attrs[PARAM_MED_STATUS_CHANGE], AttrValue::Null);
    assert_eq!(attrs[PARAM_MED_DOSAGE], AttrValue::Null);
}

#[test]
fn attributes_outside_the_window_are_not_assigned() {
    // Second drug right after the first: the first window is empty.
    let sent = Arc::new(sentence(
        "aspirin tylenol 81 mg",
        vec![
            word("aspirin", 0),
            word("tylenol", 8),
            number("81", 16),
            word("mg", 19),
        ],
    ));
    let mut annotations = vec![
        Annotation::new(Span::new(0, 7, istr("aspirin")), Semantic::Drug, Arc::clone(&sent)),
        Annotation::new(Span::new(8, 15, istr("tylenol")), Semantic::Drug, Arc::clone(&sent)),
    ];

    let extractor = DrugAttributesExtractor::new(10, &params());
    extractor.extract(&mut annotations).expect("extract");

    // The first drug's window ends at the second drug: no strength.
    assert_eq!(annotations[0].attributes[PARAM_MED_STRENGTH_NUM], AttrValue::EmptyList);
    // The second drug picks the strength up.
    assert_eq!(
        annotations[1].attributes[PARAM_MED_STRENGTH_NUM],
        AttrValue::Triple("81".into(), 16, 18)
    );
}

#[test]
fn non_drug_annotations_are_untouched() {
    let sent = Arc::new(aspirin_sentence());
    let mut annotations = vec![Annotation::new(
        Span::new(9, 16, istr("aspirin")),
        Semantic::Disorder,
        Arc::clone(&sent),
    )];
    let extractor = DrugAttributesExtractor::new(10, &params());
    extractor.extract(&mut annotations).expect("extract");
    assert!(annotations[0].attributes.is_empty());
}
