//! Dosage, form and route machines.

use fsm::conditions as cond;
use fsm::{rule, Machine, END, NT_END, NT_FALSE_TERM, START};

use crate::params::{DosageParams, FormParams, RouteParams, WordSet};
use crate::tokens::{variant, DrugTok, FormMethod};

const FORM_STATE: fsm::State = "FORM";
const DOSAGE_STATE: fsm::State = "DOSAGE";
const OF_STATE: fsm::State = "OF";
const A_STATE: fsm::State = "A";
const HYPH_STATE: fsm::State = "HYPH";
const NUM_STATE: fsm::State = "NUM";
const LEFT_PAREN: fsm::State = "LEFT_PAREN";

/// Dosage quantities: solo words, numbers followed by a route/form, `of a`
/// and parenthesised variants.
pub fn dosage_machines(params: &DosageParams) -> Vec<Machine<DrugTok>> {
    let route_form = cond::disjoint(vec![variant::route(), variant::form()]);
    let number_text = cond::word_set(params.text_number_set.clone());
    let solo_text = cond::word_set(params.solo_text_set.clone());
    let decimal_start = cond::disjoint(vec![cond::integer_value(0), cond::number()]);
    let hyphen = cond::punct_value('-');
    let left_paren = cond::punct_value('(');
    let of = cond::text_value("of");
    let a = cond::text_value("a");

    vec![Machine::new(vec![
        (
            START,
            vec![
                rule(solo_text.clone(), END),
                rule(cond::number(), DOSAGE_STATE),
                rule(variant::range_strength(), DOSAGE_STATE),
                rule(variant::fraction_strength(), DOSAGE_STATE),
                rule(number_text.clone(), DOSAGE_STATE),
                rule(decimal_start, DOSAGE_STATE),
                rule(cond::any(), START),
            ],
        ),
        (
            FORM_STATE,
            vec![rule(number_text, NT_FALSE_TERM), rule(cond::any(), START)],
        ),
        (
            DOSAGE_STATE,
            vec![
                rule(route_form.clone(), NT_END),
                rule(hyphen, HYPH_STATE),
                rule(left_paren, LEFT_PAREN),
                rule(of, OF_STATE),
                rule(cond::any(), START),
            ],
        ),
        (
            OF_STATE,
            vec![rule(a, A_STATE), rule(cond::any(), START)],
        ),
        (
            A_STATE,
            vec![rule(route_form.clone(), NT_END), rule(cond::any(), START)],
        ),
        (
            HYPH_STATE,
            vec![
                rule(solo_text, END),
                rule(cond::number(), NUM_STATE),
                rule(cond::any(), START),
            ],
        ),
        (
            NUM_STATE,
            vec![rule(route_form.clone(), NT_END), rule(cond::any(), START)],
        ),
        (
            LEFT_PAREN,
            vec![rule(route_form, NT_END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (NT_FALSE_TERM, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])]
}

/// Drug forms: single word-set membership.
pub fn form_machines(params: &FormParams) -> Vec<Machine<DrugTok>> {
    let full_text = cond::word_set(params.full_text_set.clone());
    vec![Machine::new(vec![
        (
            START,
            vec![rule(full_text, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])]
}

pub const PATCHES_MACHINE: usize = 0;
pub const GASTRIC_MACHINE: usize = 1;
pub const TOPICAL_MACHINE: usize = 2;
pub const ORAL_MACHINE: usize = 3;
pub const RECTAL_MACHINE: usize = 4;
pub const INJECT_MACHINE: usize = 5;

pub fn route_of(machine: usize) -> FormMethod {
    match machine {
        PATCHES_MACHINE => FormMethod::Transdermal,
        GASTRIC_MACHINE => FormMethod::Gastric,
        TOPICAL_MACHINE => FormMethod::Topical,
        ORAL_MACHINE => FormMethod::Oral,
        RECTAL_MACHINE => FormMethod::Rectal,
        _ => FormMethod::Intravenous,
    }
}

const LEFT_ABBREVIATE: fsm::State = "LEFT_ABBREVIATE";
const LEFT_ABBREVIATE_P: fsm::State = "LEFT_ABBREVIATE_P";
const FIRST_DOT_P: fsm::State = "FIRST_DOT_P";
const FIRST_DASH: fsm::State = "FIRST_DASH";
const MIDDLE_A_TEXT: fsm::State = "MIDDLE_A_TEXT";
const SECOND_DASH: fsm::State = "SECOND_DASH";
const LAST_TEXT: fsm::State = "LAST_TEXT";
const LEFT_DOSAGES: fsm::State = "LEFT_DOSAGES";
const RIGHT_ABBREVIATE_PV: fsm::State = "RIGHT_ABBREVIATE_PV";
const RIGHT_ABBREVIATE_PO: fsm::State = "RIGHT_ABBREVIATE_PO";

/// Route machines, one per form method.
pub fn route_machines(params: &RouteParams) -> Vec<Machine<DrugTok>> {
    vec![
        patches_machine(params),
        gastric_machine(params),
        topical_machine(params),
        oral_machine(params),
        solo_machine(params.single_rectal_word_set.clone()),
        solo_machine(params.single_inject_word_set.clone()),
    ]
}

/// The shared patches/gastric shape: specific word, or a middle-term chain.
fn middle_term_machine(middle_term_set: WordSet, specific_set: WordSet) -> Machine<DrugTok> {
    let middle = cond::word_set(middle_term_set);
    let specific = cond::word_set(specific_set);
    let dash = cond::punct_value('-');
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);
    let a = cond::text_value("a");

    Machine::new(vec![
        (
            START,
            vec![
                rule(a, LEFT_ABBREVIATE),
                rule(middle.clone(), LEFT_ABBREVIATE),
                rule(range_combine, LEFT_DOSAGES),
                rule(specific, END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE,
            vec![
                rule(middle.clone(), MIDDLE_A_TEXT),
                rule(dash.clone(), FIRST_DASH),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DASH,
            vec![rule(middle.clone(), MIDDLE_A_TEXT), rule(cond::any(), START)],
        ),
        (
            MIDDLE_A_TEXT,
            vec![
                rule(middle.clone(), LAST_TEXT),
                rule(dash, SECOND_DASH),
                rule(cond::any(), START),
            ],
        ),
        (
            SECOND_DASH,
            vec![rule(middle, LAST_TEXT), rule(cond::any(), START)],
        ),
        (LAST_TEXT, vec![rule(cond::any(), START)]),
        (LEFT_DOSAGES, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn patches_machine(params: &RouteParams) -> Machine<DrugTok> {
    middle_term_machine(
        params.middle_term_set.clone(),
        params.specified_patches_word_set.clone(),
    )
}

fn gastric_machine(params: &RouteParams) -> Machine<DrugTok> {
    middle_term_machine(
        params.middle_term_set.clone(),
        params.specified_gastric_word_set.clone(),
    )
}

fn topical_machine(params: &RouteParams) -> Machine<DrugTok> {
    let middle = cond::word_set(params.middle_term_set.clone());
    let solo = cond::word_set(params.single_topical_word_set.clone());
    let dash = cond::punct_value('-');
    let dot = cond::punct_value('.');
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);
    let a = cond::text_value("a");
    let p = cond::text_value("p");
    let v = cond::text_value("v");

    Machine::new(vec![
        (
            START,
            vec![
                rule(a, LEFT_ABBREVIATE),
                rule(p, LEFT_ABBREVIATE_P),
                rule(middle.clone(), LEFT_ABBREVIATE),
                rule(range_combine, LEFT_DOSAGES),
                rule(solo.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_P,
            vec![rule(dot.clone(), FIRST_DOT_P), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_P,
            vec![
                rule(solo.clone(), END),
                rule(v, RIGHT_ABBREVIATE_PV),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE,
            vec![
                rule(middle.clone(), MIDDLE_A_TEXT),
                rule(dash.clone(), FIRST_DASH),
                rule(solo, END),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DASH,
            vec![rule(middle.clone(), MIDDLE_A_TEXT), rule(cond::any(), START)],
        ),
        (
            MIDDLE_A_TEXT,
            vec![
                rule(middle.clone(), LAST_TEXT),
                rule(dash, SECOND_DASH),
                rule(cond::any(), START),
            ],
        ),
        (
            SECOND_DASH,
            vec![rule(middle, LAST_TEXT), rule(cond::any(), START)],
        ),
        (LAST_TEXT, vec![rule(cond::any(), START)]),
        (LEFT_DOSAGES, vec![rule(cond::any(), START)]),
        (
            RIGHT_ABBREVIATE_PV,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn oral_machine(params: &RouteParams) -> Machine<DrugTok> {
    let middle = cond::word_set(params.middle_term_set.clone());
    let solo = cond::word_set(params.single_oral_word_set.clone());
    let specific = cond::word_set(params.specified_oral_word_set.clone());
    let dash = cond::punct_value('-');
    let dot = cond::punct_value('.');
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);
    let a = cond::text_value("a");
    let p = cond::text_value("p");
    let o = cond::text_value("o");

    Machine::new(vec![
        (
            START,
            vec![
                rule(a, LEFT_ABBREVIATE),
                rule(p, LEFT_ABBREVIATE_P),
                rule(middle.clone(), LEFT_ABBREVIATE),
                rule(range_combine, LEFT_DOSAGES),
                rule(solo.clone(), END),
                rule(specific, END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_P,
            vec![rule(dot.clone(), FIRST_DOT_P), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_P,
            vec![
                rule(solo.clone(), END),
                rule(o, RIGHT_ABBREVIATE_PO),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE,
            vec![
                rule(middle.clone(), MIDDLE_A_TEXT),
                rule(dash.clone(), FIRST_DASH),
                rule(solo, END),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DASH,
            vec![rule(middle.clone(), MIDDLE_A_TEXT), rule(cond::any(), START)],
        ),
        (
            MIDDLE_A_TEXT,
            vec![
                rule(middle.clone(), LAST_TEXT),
                rule(dash, SECOND_DASH),
                rule(cond::any(), START),
            ],
        ),
        (
            SECOND_DASH,
            vec![rule(middle, LAST_TEXT), rule(cond::any(), START)],
        ),
        (LAST_TEXT, vec![rule(cond::any(), START)]),
        (LEFT_DOSAGES, vec![rule(cond::any(), START)]),
        (
            RIGHT_ABBREVIATE_PO,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn solo_machine(solo_set: WordSet) -> Machine<DrugTok> {
    let solo = cond::word_set(solo_set);
    Machine::new(vec![
        (START, vec![rule(solo, END), rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}
