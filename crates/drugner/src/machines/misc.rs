//! Duration, time, change-status and sub-section machines.

use fsm::conditions as cond;
use fsm::{rule, Machine, END, NT_END, START};

use crate::params::{ChangeStatusParams, DurationParams, SubSectionParams, TimeParams, WordSet};
use crate::tokens::{variant, DrugChangeStatus, DrugTok, SubSectionStatus};

const LEFT_ABBREVIATE: fsm::State = "LEFT_ABBREVIATE";
const START_ABBREVIATE: fsm::State = "START_ABBREVIATE";
const MIDDLE_TERM: fsm::State = "MIDDLE_TERM";
const MIDDLE_TEXT: fsm::State = "MIDDLE_TEXT";
const FIRST_DASH: fsm::State = "FIRST_DASH";
const SECOND_DASH: fsm::State = "SECOND_DASH";
const LAST_TEXT: fsm::State = "LAST_TEXT";
const FINAL_TERM: fsm::State = "FINAL_TERM";
const FINAL_APPEND: fsm::State = "FINAL_APPEND";
const ANOTHER_APPEND: fsm::State = "ANOTHER_APPEND";
const FINAL_TEXT: fsm::State = "FINAL_TEXT";

/// Duration machines: `for 2 weeks`, `x 10 days`, ranged variants.
pub fn duration_machines(params: &DurationParams) -> Vec<Machine<DrugTok>> {
    vec![
        duration_machine(params),
        duration_second_machine(params),
    ]
}

fn duration_machine(params: &DurationParams) -> Machine<DrugTok> {
    let middle_text = cond::contains_set(params.middle_numeric_term_set.clone());
    let period = cond::contains_set(params.period_set.clone());
    let specific = cond::contains_set(params.specified_word_set.clone());
    let combined = cond::contains_set(params.combined_set.clone());
    let dash = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![rule(specific, LEFT_ABBREVIATE), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE,
            vec![
                rule(variant::range_strength(), MIDDLE_TEXT),
                rule(middle_text.clone(), MIDDLE_TEXT),
                rule(dash.clone(), FIRST_DASH),
                rule(cond::number(), MIDDLE_TEXT),
                rule(combined, END),
                rule(cond::any(), START),
            ],
        ),
        (
            MIDDLE_TEXT,
            vec![
                rule(variant::range_strength(), LAST_TEXT),
                rule(middle_text.clone(), LAST_TEXT),
                rule(dash, FIRST_DASH),
                rule(period.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DASH,
            vec![rule(middle_text.clone(), MIDDLE_TEXT), rule(cond::any(), START)],
        ),
        (
            SECOND_DASH,
            vec![
                rule(middle_text.clone(), LAST_TEXT),
                rule(period.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            LAST_TEXT,
            vec![
                rule(middle_text, END),
                rule(period, END),
                rule(cond::any(), START),
            ],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn duration_second_machine(params: &DurationParams) -> Machine<DrugTok> {
    let numeric_text = cond::contains_set(params.middle_numeric_term_set.clone());
    let period = cond::contains_set(params.period_set.clone());
    let specific = cond::contains_set(params.specified_word_set.clone());
    let append = cond::contains_set(params.append_word_set.clone());

    Machine::new(vec![
        (
            START,
            vec![rule(specific, START_ABBREVIATE), rule(cond::any(), START)],
        ),
        (
            START_ABBREVIATE,
            vec![
                rule(append.clone(), MIDDLE_TERM),
                rule(cond::number(), FINAL_TERM),
                rule(cond::any(), START),
            ],
        ),
        (
            MIDDLE_TERM,
            vec![
                rule(variant::range_strength(), ANOTHER_APPEND),
                rule(append, FINAL_TERM),
                rule(numeric_text.clone(), FINAL_APPEND),
                rule(cond::number(), ANOTHER_APPEND),
                rule(cond::any(), START),
            ],
        ),
        (
            FINAL_TERM,
            vec![
                rule(variant::range_strength(), FINAL_TEXT),
                rule(numeric_text, FINAL_TEXT),
                rule(cond::number(), FINAL_TEXT),
                rule(cond::any(), START),
            ],
        ),
        (
            FINAL_APPEND,
            vec![rule(period.clone(), END), rule(cond::any(), START)],
        ),
        (
            ANOTHER_APPEND,
            vec![rule(period.clone(), END), rule(cond::any(), START)],
        ),
        (
            FINAL_TEXT,
            vec![rule(period, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

const HOUR_NUM: fsm::State = "HOUR_NUM";
const HOUR_MIN_TEXT: fsm::State = "HOUR_MIN_TEXT";
const AMPM_PERIOD: fsm::State = "AM_PM_PERIOD_TEXT";
const SEPARATOR: fsm::State = "SEPARATOR";

/// Time machines: `4 pm`, `4 p.m.`, 24-hour `16:30`.
pub fn time_machines(params: &TimeParams) -> Vec<Machine<DrugTok>> {
    vec![twelve_hour_machine(params), twenty_four_hour_machine()]
}

fn twelve_hour_machine(params: &TimeParams) -> Machine<DrugTok> {
    let day_night = cond::word_set(params.day_night_set.clone());
    let hour_num = cond::integer_range(1, 12);
    let hour_min = cond::hour_minute(1, 12, 0, 59);
    let day_night_period = cond::day_night_word();
    let closing_period = cond::punct_value('.');

    Machine::new(vec![
        (
            START,
            vec![
                rule(hour_num, HOUR_NUM),
                rule(hour_min, HOUR_MIN_TEXT),
                rule(cond::any(), START),
            ],
        ),
        (
            HOUR_MIN_TEXT,
            vec![
                rule(day_night.clone(), END),
                rule(day_night_period.clone(), AMPM_PERIOD),
                rule(cond::any(), START),
            ],
        ),
        (
            HOUR_NUM,
            vec![
                rule(day_night, END),
                rule(day_night_period, AMPM_PERIOD),
                rule(cond::any(), START),
            ],
        ),
        (
            AMPM_PERIOD,
            vec![rule(closing_period, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn twenty_four_hour_machine() -> Machine<DrugTok> {
    let hour = cond::integer_range(0, 23);
    let minute = cond::integer_range(0, 59);
    let separator = cond::punct_value(':');

    Machine::new(vec![
        (
            START,
            vec![rule(hour, HOUR_NUM), rule(cond::any(), START)],
        ),
        (
            HOUR_NUM,
            vec![rule(separator, SEPARATOR), rule(cond::any(), START)],
        ),
        (
            SEPARATOR,
            vec![rule(minute, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

pub const START_STATUS_MACHINE: usize = 0;
pub const STOP_STATUS_MACHINE: usize = 1;
pub const INCREASE_STATUS_MACHINE: usize = 2;
pub const DECREASE_STATUS_MACHINE: usize = 3;
pub const NO_CHANGE_STATUS_MACHINE: usize = 4;
pub const CHANGE_STATUS_MACHINE: usize = 5;
pub const SUM_STATUS_MACHINE: usize = 6;
pub const MAX_STATUS_MACHINE: usize = 7;
pub const INCREASE_FROM_STATUS_MACHINE: usize = 8;
pub const DECREASE_FROM_STATUS_MACHINE: usize = 9;

pub fn change_status_of(machine: usize) -> DrugChangeStatus {
    match machine {
        START_STATUS_MACHINE => DrugChangeStatus::Start,
        STOP_STATUS_MACHINE => DrugChangeStatus::Stop,
        INCREASE_STATUS_MACHINE => DrugChangeStatus::Increase,
        DECREASE_STATUS_MACHINE => DrugChangeStatus::Decrease,
        CHANGE_STATUS_MACHINE => DrugChangeStatus::Other,
        SUM_STATUS_MACHINE => DrugChangeStatus::Sum,
        MAX_STATUS_MACHINE => DrugChangeStatus::Max,
        INCREASE_FROM_STATUS_MACHINE => DrugChangeStatus::IncreaseFrom,
        DECREASE_FROM_STATUS_MACHINE => DrugChangeStatus::DecreaseFrom,
        _ => DrugChangeStatus::NoChange,
    }
}

const THEN_STATUS: fsm::State = "THEN_STATUS";
const SECTION_STATUS: fsm::State = "SECTION_STATUS";
const BEGIN_END: fsm::State = "BEGIN_END";
const END_END: fsm::State = "END_END";
const LEFT_STATUS: fsm::State = "LEFT_STATUS";
const LEFT_DOSAGES: fsm::State = "LEFT_DOSAGES";
const DUAL_WORD: fsm::State = "DUAL_WORD";
const FOUND_DUAL_FIRST: fsm::State = "FOUND_DUAL_FIRST";
const BY_STATE: fsm::State = "BY";

/// Change-status machines, indexed per the `*_STATUS_MACHINE` consts.
pub fn change_status_machines(params: &ChangeStatusParams) -> Vec<Machine<DrugTok>> {
    vec![
        start_status_machine(params),
        stop_status_machine(params),
        dual_status_machine(
            params.single_increase_word_set.clone(),
            params.first_increase_dual_word_set.clone(),
            params.second_dual_word_set.clone(),
            params.multi_then_word_set.clone(),
        ),
        dual_status_machine(
            params.single_decrease_word_set.clone(),
            params.first_decrease_dual_word_set.clone(),
            params.second_dual_word_set.clone(),
            params.multi_then_word_set.clone(),
        ),
        no_change_status_machine(params),
        change_status_machine(params),
        sum_status_machine(params),
        max_status_machine(params),
        from_status_machine(
            params.first_increase_dual_word_set.clone(),
            params.second_dual_from_word_set.clone(),
            params.multi_then_word_set.clone(),
        ),
        from_status_machine(
            params.first_decrease_dual_word_set.clone(),
            params.second_dual_from_word_set.clone(),
            params.multi_then_word_set.clone(),
        ),
    ]
}

fn start_status_machine(params: &ChangeStatusParams) -> Machine<DrugTok> {
    let solo = cond::contains_set(params.single_start_word_set.clone());
    let first_dual = cond::contains_set(params.first_start_dual_word_set.clone());
    let second_dual = cond::contains_set(params.second_dual_word_set.clone());
    let then = cond::contains_set(params.multi_then_word_set.clone());
    let section = cond::text_value("section");
    let section_bracket = cond::punct_value('[');
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(then, THEN_STATUS),
                rule(first_dual.clone(), SECTION_STATUS),
                rule(section_bracket, BEGIN_END),
                rule(range_combine, LEFT_DOSAGES),
                rule(variant::strength(), LEFT_STATUS),
                rule(solo.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            THEN_STATUS,
            vec![
                rule(first_dual, SECTION_STATUS),
                rule(solo.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            SECTION_STATUS,
            vec![rule(second_dual, END), rule(cond::any(), START)],
        ),
        (
            BEGIN_END,
            vec![rule(solo.clone(), END_END), rule(cond::any(), START)],
        ),
        (
            END_END,
            vec![rule(section, LEFT_STATUS), rule(cond::any(), START)],
        ),
        (
            LEFT_STATUS,
            vec![rule(solo, END), rule(cond::any(), START)],
        ),
        (LEFT_DOSAGES, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn stop_status_machine(params: &ChangeStatusParams) -> Machine<DrugTok> {
    let solo = cond::contains_set(params.single_stop_word_set.clone());
    let first_dual = cond::contains_set(params.first_stop_dual_word_set.clone());
    let second_off = cond::contains_set(params.second_off_dual_word_set.clone());
    let second_dual = cond::contains_set(params.second_dual_word_set.clone());
    let then = cond::contains_set(params.multi_then_word_set.clone());
    let section = cond::text_value("section");
    let section_bracket = cond::punct_value('[');
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(then, THEN_STATUS),
                rule(solo.clone(), END),
                rule(first_dual.clone(), SECTION_STATUS),
                rule(section_bracket, BEGIN_END),
                rule(range_combine, LEFT_DOSAGES),
                rule(variant::strength(), LEFT_STATUS),
                rule(cond::any(), START),
            ],
        ),
        (
            THEN_STATUS,
            vec![
                rule(solo.clone(), SECTION_STATUS),
                rule(first_dual, SECTION_STATUS),
                rule(cond::any(), START),
            ],
        ),
        (
            SECTION_STATUS,
            vec![
                rule(second_dual, END),
                rule(second_off, END),
                rule(cond::any(), START),
            ],
        ),
        (
            BEGIN_END,
            vec![rule(solo.clone(), END_END), rule(cond::any(), START)],
        ),
        (
            END_END,
            vec![rule(section, LEFT_STATUS), rule(cond::any(), START)],
        ),
        (
            LEFT_STATUS,
            vec![rule(solo, END), rule(cond::any(), START)],
        ),
        (LEFT_DOSAGES, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

/// The shared increase/decrease shape.
fn dual_status_machine(
    single_set: WordSet,
    first_dual_set: WordSet,
    second_dual_set: WordSet,
    then_set: WordSet,
) -> Machine<DrugTok> {
    let solo = cond::contains_set(single_set);
    let first_dual = cond::contains_set(first_dual_set);
    let second_dual = cond::contains_set(second_dual_set);
    let then = cond::contains_set(then_set);

    Machine::new(vec![
        (
            START,
            vec![
                rule(then, THEN_STATUS),
                rule(solo.clone(), END),
                rule(first_dual.clone(), SECTION_STATUS),
                rule(cond::any(), START),
            ],
        ),
        (
            THEN_STATUS,
            vec![
                rule(solo, END),
                rule(first_dual, SECTION_STATUS),
                rule(cond::any(), START),
            ],
        ),
        (
            SECTION_STATUS,
            vec![rule(second_dual, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

/// The shared increase-from/decrease-from shape.
fn from_status_machine(
    first_dual_set: WordSet,
    second_from_set: WordSet,
    then_set: WordSet,
) -> Machine<DrugTok> {
    let first_dual = cond::contains_set(first_dual_set);
    let second_from = cond::contains_set(second_from_set);
    let then = cond::contains_set(then_set);

    Machine::new(vec![
        (
            START,
            vec![
                rule(then, THEN_STATUS),
                rule(first_dual.clone(), SECTION_STATUS),
                rule(cond::any(), START),
            ],
        ),
        (
            THEN_STATUS,
            vec![rule(first_dual, SECTION_STATUS), rule(cond::any(), START)],
        ),
        (
            SECTION_STATUS,
            vec![rule(second_from, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn no_change_status_machine(params: &ChangeStatusParams) -> Machine<DrugTok> {
    let solo = cond::contains_set(params.single_no_change_word_set.clone());
    let first_dual = cond::contains_set(params.first_no_change_dual_word_set.clone());
    let second_dual = cond::contains_set(params.second_dual_word_set.clone());
    let then = cond::contains_set(params.multi_then_word_set.clone());
    let no_change = cond::contains_set(params.no_change_word_set.clone());
    let change = cond::contains_set(params.change_word_set.clone());
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(then, THEN_STATUS),
                rule(solo.clone(), END),
                rule(first_dual.clone(), SECTION_STATUS),
                rule(range_combine, LEFT_DOSAGES),
                rule(variant::strength(), LEFT_STATUS),
                rule(no_change, DUAL_WORD),
                rule(cond::any(), START),
            ],
        ),
        (
            THEN_STATUS,
            vec![
                rule(first_dual, SECTION_STATUS),
                rule(solo.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            SECTION_STATUS,
            vec![rule(second_dual, END), rule(cond::any(), START)],
        ),
        (
            LEFT_STATUS,
            vec![rule(solo, END), rule(cond::any(), START)],
        ),
        (
            DUAL_WORD,
            vec![rule(change, END), rule(cond::any(), START)],
        ),
        (LEFT_DOSAGES, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn change_status_machine(params: &ChangeStatusParams) -> Machine<DrugTok> {
    let single_change = cond::contains_set(params.single_change_word_set.clone());
    let change = cond::contains_set(params.change_word_set.clone());
    let followed = cond::text_value("followed");
    let by = cond::text_value("by");

    Machine::new(vec![
        (
            START,
            vec![
                rule(single_change, END),
                rule(followed, BY_STATE),
                rule(change, END),
                rule(cond::any(), START),
            ],
        ),
        (
            BY_STATE,
            vec![rule(by, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn sum_status_machine(params: &ChangeStatusParams) -> Machine<DrugTok> {
    let single_sum = cond::contains_set(params.single_sum_word_set.clone());
    Machine::new(vec![
        (
            START,
            vec![rule(single_sum, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn max_status_machine(params: &ChangeStatusParams) -> Machine<DrugTok> {
    let single_max = cond::contains_set(params.single_max_word_set.clone());
    let first_dual = cond::contains_set(params.first_max_dual_word_set.clone());
    let second_dual = cond::contains_set(params.second_max_dual_word_set.clone());

    Machine::new(vec![
        (
            START,
            vec![
                rule(single_max, END),
                rule(first_dual, FOUND_DUAL_FIRST),
                rule(cond::any(), START),
            ],
        ),
        (
            FOUND_DUAL_FIRST,
            vec![rule(second_dual, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

pub const PROBABLE_SUBSECTION_MACHINE: usize = 0;
pub const HISTORY_SUBSECTION_MACHINE: usize = 1;
pub const CONFIRMED_SUBSECTION_MACHINE: usize = 2;

pub fn subsection_of(machine: usize) -> SubSectionStatus {
    match machine {
        PROBABLE_SUBSECTION_MACHINE => SubSectionStatus::Probable,
        HISTORY_SUBSECTION_MACHINE => SubSectionStatus::History,
        CONFIRMED_SUBSECTION_MACHINE => SubSectionStatus::Confirmed,
        _ => SubSectionStatus::FamilyHistory,
    }
}

const MED: fsm::State = "MED";
const MID_WORD: fsm::State = "MID_WORD";
const END_WORD: fsm::State = "END_WORD";
const FIRST_DOT: fsm::State = "FIRST_DOT";
const R_STATE: fsm::State = "R";
const SECOND_DOT: fsm::State = "SECOND_DOT";
const N_STATE: fsm::State = "N";
const THIRD_DOT: fsm::State = "THIRD_DOT";

/// Sub-section indicator machines: probable, history, confirmed.
pub fn subsection_machines(params: &SubSectionParams) -> Vec<Machine<DrugTok>> {
    vec![
        probable_subsection_machine(params),
        history_subsection_machine(params),
        confirmed_subsection_machine(params),
    ]
}

fn probable_subsection_machine(params: &SubSectionParams) -> Machine<DrugTok> {
    let begin = cond::contains_set(params.probable_sub_begin_set.clone());
    let next = cond::contains_set(params.probable_sub_next_set.clone());
    let end_set = cond::contains_set(params.probable_sub_end_set.clone());
    let middle = cond::contains_set(params.middle_word_set.clone());

    Machine::new(vec![
        (
            START,
            vec![rule(begin, MED), rule(cond::any(), START)],
        ),
        (
            MED,
            vec![
                rule(next, END),
                rule(middle, END_WORD),
                rule(cond::any(), START),
            ],
        ),
        (
            END_WORD,
            vec![rule(end_set, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn history_subsection_machine(params: &SubSectionParams) -> Machine<DrugTok> {
    let begin = cond::contains_set(params.history_sub_begin_set.clone());
    let mid = cond::contains_set(params.history_sub_mid_set.clone());
    let next = cond::contains_set(params.history_sub_next_set.clone());
    let colon = cond::punct_value(':');

    Machine::new(vec![
        (
            START,
            vec![rule(begin, MED), rule(cond::any(), START)],
        ),
        (
            MED,
            vec![
                rule(next.clone(), END),
                rule(mid, MID_WORD),
                rule(colon.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            MID_WORD,
            vec![rule(next, END), rule(colon, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn confirmed_subsection_machine(params: &SubSectionParams) -> Machine<DrugTok> {
    let begin = cond::contains_set(params.confirmed_sub_begin_set.clone());
    let next = cond::contains_set(params.confirmed_sub_next_set.clone());
    let dot = cond::punct_value('.');
    let p = cond::text_value("p");
    let r = cond::text_value("r");
    let n = cond::text_value("n");

    Machine::new(vec![
        (
            START,
            vec![
                rule(begin, MED),
                rule(p, FIRST_DOT),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DOT,
            vec![rule(dot.clone(), R_STATE), rule(cond::any(), START)],
        ),
        (
            R_STATE,
            vec![rule(r, SECOND_DOT), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT,
            vec![rule(dot.clone(), N_STATE), rule(cond::any(), START)],
        ),
        (
            N_STATE,
            vec![rule(n, THIRD_DOT), rule(cond::any(), START)],
        ),
        (
            THIRD_DOT,
            vec![rule(dot, MED), rule(cond::any(), START)],
        ),
        (
            MED,
            vec![rule(next, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}
