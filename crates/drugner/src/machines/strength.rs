//! Strength-family machines: fractions, ranges, decimals, suffixes, units
//! and the strength matcher itself.

use fsm::conditions as cond;
use fsm::{rule, Machine, END, NT_END, NT_END_HYPH, NT_FALSE_TERM, START};

use crate::params::{
    FractionStrengthParams, RangeStrengthParams, StrengthParams, StrengthUnitParams,
    SuffixStrengthParams,
};
use crate::tokens::{variant, DrugTok};

pub const STRENGTH_UNIT_COMBINED_MACHINE: usize = 0;

const NUMERATOR_LEFT: fsm::State = "NUMERATOR_LEFT";
const DOT_LEFT: fsm::State = "DOT_LEFT";
const HYPHEN: fsm::State = "HYPHEN";
const NUMERATOR_RIGHT: fsm::State = "NUMERATOR_RIGHT";
const DOT_RIGHT: fsm::State = "DOT_RIGHT";
const DEC_PART_NUM: fsm::State = "DEC_PART_NUM";
const FSLASH: fsm::State = "FSLASH";
const NUMERATOR_NUM: fsm::State = "NUMERATOR_NUM";
const NUMERATOR_TEXT: fsm::State = "NUMERATOR_TEXT";

/// Fraction strengths: `1/2`, `one half`, `.5-` slash forms.
pub fn fraction_machines(params: &FractionStrengthParams) -> Vec<Machine<DrugTok>> {
    vec![
        strength_slash_machine(params),
        standard_fraction_machine(params),
    ]
}

fn strength_slash_machine(params: &FractionStrengthParams) -> Machine<DrugTok> {
    let left_contains = cond::contains_set(params.text_numerator_set.clone());
    let fslash = cond::punct_value('/');
    let dot = cond::punct_value('.');
    let hyphen = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![
                rule(cond::number(), NUMERATOR_LEFT),
                rule(left_contains, NUMERATOR_LEFT),
                rule(cond::any(), START),
            ],
        ),
        (
            NUMERATOR_LEFT,
            vec![
                rule(dot.clone(), DOT_LEFT),
                rule(fslash.clone(), FSLASH),
                rule(hyphen.clone(), NUMERATOR_RIGHT),
                rule(cond::any(), START),
            ],
        ),
        (
            DOT_LEFT,
            vec![rule(cond::number(), HYPHEN), rule(cond::any(), START)],
        ),
        (
            HYPHEN,
            vec![rule(hyphen, NUMERATOR_RIGHT), rule(cond::any(), START)],
        ),
        (
            NUMERATOR_RIGHT,
            vec![rule(cond::number(), END), rule(cond::any(), START)],
        ),
        (
            DOT_RIGHT,
            vec![rule(dot, FSLASH), rule(cond::any(), START)],
        ),
        (
            DEC_PART_NUM,
            vec![rule(fslash.clone(), FSLASH), rule(cond::any(), START)],
        ),
        (
            FSLASH,
            vec![rule(cond::number(), END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn standard_fraction_machine(params: &FractionStrengthParams) -> Machine<DrugTok> {
    let numerator = cond::contains_set(params.text_numerator_set.clone());
    let denominator = cond::contains_set(params.text_denominator_set.clone());
    let fslash = cond::punct_value('/');

    Machine::new(vec![
        (
            START,
            vec![
                rule(cond::number(), NUMERATOR_NUM),
                rule(numerator, NUMERATOR_TEXT),
                rule(denominator.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            NUMERATOR_NUM,
            vec![
                rule(fslash, FSLASH),
                rule(denominator.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            FSLASH,
            vec![rule(cond::number(), END), rule(cond::any(), START)],
        ),
        (
            NUMERATOR_TEXT,
            vec![rule(denominator, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

const LEFT_NUM_TEXT: fsm::State = "LEFT_NUM_TEXT";
const LEFT_NUM_INTEGER: fsm::State = "LEFT_NUM_INTEGER";
const DASH: fsm::State = "DASH";
const DASH_1: fsm::State = "DASH_1";
const DASH_2: fsm::State = "DASH_2";
const MIDDLE_DASH: fsm::State = "MIDDLE_DASH";
const RIGHT_NUM_TEXT: fsm::State = "RIGHT_NUM_TEXT";
const DASH_ANOTHER: fsm::State = "DASH_ANOTHER";
const DOT: fsm::State = "DOT";

/// Range strengths: `250-300`, `two-three`, `25.4-30.4`, `two-to-three`.
pub fn range_machines(params: &RangeStrengthParams) -> Vec<Machine<DrugTok>> {
    vec![
        dash_machine(params),
        dot_dash_machine(),
        dash_dash_machine(params),
    ]
}

fn dash_machine(params: &RangeStrengthParams) -> Machine<DrugTok> {
    let text_number = cond::contains_set(params.text_number_set.clone());
    let hyphenated = cond::contains_set(params.hyphenated_set.clone());
    let hyphen = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![
                rule(cond::number(), LEFT_NUM_INTEGER),
                rule(hyphenated, END),
                rule(text_number.clone(), LEFT_NUM_TEXT),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_NUM_INTEGER,
            vec![rule(hyphen.clone(), DASH), rule(cond::any(), START)],
        ),
        (
            LEFT_NUM_TEXT,
            vec![rule(hyphen, DASH), rule(cond::any(), START)],
        ),
        (
            DASH,
            vec![
                rule(cond::number(), END),
                rule(text_number.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            DASH_1,
            vec![
                rule(cond::number(), END),
                rule(text_number, END),
                rule(cond::any(), START),
            ],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn dot_dash_machine() -> Machine<DrugTok> {
    let hyphen = cond::punct_value('-');
    let dot = cond::punct_value('.');

    Machine::new(vec![
        (
            START,
            vec![
                rule(cond::number(), LEFT_NUM_INTEGER),
                rule(variant::range(), LEFT_NUM_INTEGER),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_NUM_INTEGER,
            vec![rule(dot, DOT), rule(cond::any(), START)],
        ),
        (
            DOT,
            vec![rule(cond::number(), DEC_PART_NUM), rule(cond::any(), START)],
        ),
        (
            DEC_PART_NUM,
            vec![rule(hyphen, DASH), rule(cond::any(), START)],
        ),
        (
            DASH,
            vec![
                rule(cond::number(), END),
                rule(variant::fraction_strength(), END),
                rule(cond::any(), START),
            ],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn dash_dash_machine(params: &RangeStrengthParams) -> Machine<DrugTok> {
    let text_number = cond::contains_set(params.text_number_set.clone());
    let range_set = cond::contains_set(params.range_set.clone());
    let hyphen = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![
                rule(text_number.clone(), LEFT_NUM_TEXT),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_NUM_TEXT,
            vec![
                rule(hyphen.clone(), DASH_2),
                rule(range_set.clone(), RIGHT_NUM_TEXT),
                rule(cond::any(), START),
            ],
        ),
        (
            DASH_2,
            vec![
                rule(cond::number(), END),
                rule(text_number.clone(), END),
                rule(range_set, MIDDLE_DASH),
                rule(cond::any(), START),
            ],
        ),
        (
            MIDDLE_DASH,
            vec![rule(hyphen, DASH_ANOTHER), rule(cond::any(), START)],
        ),
        (
            RIGHT_NUM_TEXT,
            vec![
                rule(cond::number(), END),
                rule(text_number.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            DASH_ANOTHER,
            vec![
                rule(text_number, END),
                rule(cond::number(), END),
                rule(cond::any(), START),
            ],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

const ZERO_NUM: fsm::State = "ZERO_NUM";
const FRACTION_TEXT: fsm::State = "FRACTION_TEXT";

/// Decimal strengths of the shape `0.5-`.
pub fn decimal_machines() -> Vec<Machine<DrugTok>> {
    let zero = cond::integer_value(0);
    let dot = cond::punct_value('.');
    let dash = cond::punct_value('-');

    vec![Machine::new(vec![
        (
            START,
            vec![rule(zero, ZERO_NUM), rule(cond::any(), START)],
        ),
        (
            ZERO_NUM,
            vec![rule(dot, FRACTION_TEXT), rule(cond::any(), START)],
        ),
        (
            FRACTION_TEXT,
            vec![rule(cond::number(), DASH), rule(cond::any(), START)],
        ),
        (DASH, vec![rule(dash, END), rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])]
}

/// Strength suffixes: a strength followed by `/` and a suffix word.
pub fn suffix_machines(params: &SuffixStrengthParams) -> Vec<Machine<DrugTok>> {
    let right_text = cond::contains_set(params.text_suffix_set.clone());
    let fslash = cond::punct_value('/');

    vec![Machine::new(vec![
        (
            START,
            vec![rule(variant::strength(), LEFT_NUM_TEXT), rule(cond::any(), START)],
        ),
        (
            LEFT_NUM_TEXT,
            vec![rule(fslash, FSLASH), rule(cond::any(), START)],
        ),
        (
            FSLASH,
            vec![
                rule(right_text.clone(), END),
                rule(cond::number(), RIGHT_NUM_TEXT),
                rule(cond::any(), START),
            ],
        ),
        (
            RIGHT_NUM_TEXT,
            vec![rule(right_text, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])]
}

const UNIT: fsm::State = "UNIT";

/// Strength units: the combined machine matches `25mg`-style fused tokens,
/// the plain machine bare unit words; both recover from a `-unit` false
/// start.
pub fn strength_unit_machines(params: &StrengthUnitParams) -> Vec<Machine<DrugTok>> {
    vec![
        strength_unit_machine(cond::contains_set(params.full_text_set.clone())),
        strength_unit_machine(cond::word_set(params.full_text_set.clone())),
    ]
}

fn strength_unit_machine(unit_cond: fsm::Cond<DrugTok>) -> Machine<DrugTok> {
    let percent = cond::punct_value('%');
    let dash = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![
                rule(unit_cond.clone(), END),
                rule(dash, UNIT),
                rule(percent.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            UNIT,
            vec![
                rule(unit_cond, NT_FALSE_TERM),
                rule(percent, END),
                rule(cond::any(), START),
            ],
        ),
        (NT_FALSE_TERM, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

const DATE: fsm::State = "DATE";
const CONNECT: fsm::State = "CONNECT";
const DECIMAL: fsm::State = "DECIMAL";
const COMPLEX: fsm::State = "COMPLEX";
const HYPHEN_STATE: fsm::State = "HYPHEN_TAIL";

/// The strength matcher: numbers or number words joined to a strength unit.
pub fn strength_machines(params: &StrengthParams) -> Vec<Machine<DrugTok>> {
    let number_text = cond::word_set(params.number_text_set.clone());
    let non_slash = cond::negate(cond::punct_value('/'));
    let dot = cond::punct_value('.');
    let dash = cond::punct_value('-');

    vec![Machine::new(vec![
        (
            START,
            vec![
                rule(variant::range_strength(), END),
                rule(variant::fraction_strength(), DATE),
                rule(cond::number(), CONNECT),
                rule(number_text, CONNECT),
                rule(variant::strength_unit_combined(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            DATE,
            vec![rule(non_slash, CONNECT), rule(cond::any(), START)],
        ),
        (
            CONNECT,
            vec![
                rule(variant::strength_unit(), NT_END),
                rule(variant::strength_unit_combined(), END),
                rule(dash.clone(), UNIT),
                rule(dot, DECIMAL),
                rule(cond::any(), START),
            ],
        ),
        (
            DECIMAL,
            vec![
                rule(variant::strength_unit(), NT_END),
                rule(variant::strength_unit_combined(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            UNIT,
            vec![
                rule(variant::strength_unit(), NT_END_HYPH),
                rule(variant::strength_unit_combined(), END),
                rule(dash.clone(), UNIT),
                rule(cond::number(), COMPLEX),
                rule(cond::any(), START),
            ],
        ),
        (
            COMPLEX,
            vec![rule(dash, HYPHEN_STATE), rule(cond::any(), START)],
        ),
        (
            HYPHEN_STATE,
            vec![
                rule(variant::strength_unit(), NT_END_HYPH),
                rule(cond::any(), START),
            ],
        ),
        (NT_END_HYPH, vec![rule(cond::any(), START)]),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])]
}
