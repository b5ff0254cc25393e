//! Frequency and frequency-unit machines.

use annot::{istr, Sentence, Span};
use fsm::conditions as cond;
use fsm::{run_machines, rule, ExitSpec, FsmError, Machine, END, NT_END, NT_FALSE_TERM, SKIP_FIRST, START};

use crate::params::{FrequencyParams, FrequencyUnitParams, WordSet};
use crate::tokens::{variant, DrugOut, DrugTok, FrequencyQuantity, OutKind};

pub const DAILY_MACHINE: usize = 0;
pub const SIX_TIMES_MACHINE: usize = 1;
pub const FIVE_TIMES_MACHINE: usize = 2;
pub const THREE_TIMES_MACHINE: usize = 3;
pub const FOUR_TIMES_MACHINE: usize = 4;
pub const EVERY_OTHER_HOUR_MACHINE: usize = 5;
pub const EVERY_OTHER_DAY_MACHINE: usize = 6;
pub const TWICE_A_DAY_MACHINE: usize = 7;
pub const DAILY_SUFFIX_MACHINE: usize = 8;
pub const WEEKLY_MACHINE: usize = 9;
pub const HOURLY_SUFFIX_MACHINE: usize = 10;
pub const WEEKLY_SUFFIX_MACHINE: usize = 11;
pub const MONTHLY_SUFFIX_MACHINE: usize = 12;
pub const YEARLY_SUFFIX_MACHINE: usize = 13;
pub const PRN_MACHINE: usize = 14;

pub fn quantity_of(machine: usize) -> FrequencyQuantity {
    match machine {
        DAILY_MACHINE | DAILY_SUFFIX_MACHINE => FrequencyQuantity::One,
        SIX_TIMES_MACHINE => FrequencyQuantity::Six,
        FIVE_TIMES_MACHINE => FrequencyQuantity::Five,
        THREE_TIMES_MACHINE => FrequencyQuantity::Three,
        FOUR_TIMES_MACHINE => FrequencyQuantity::Four,
        EVERY_OTHER_HOUR_MACHINE => FrequencyQuantity::Twelve,
        EVERY_OTHER_DAY_MACHINE => FrequencyQuantity::EveryOtherDay,
        TWICE_A_DAY_MACHINE => FrequencyQuantity::Two,
        WEEKLY_MACHINE | WEEKLY_SUFFIX_MACHINE => FrequencyQuantity::Weekly,
        HOURLY_SUFFIX_MACHINE => FrequencyQuantity::TwentyFour,
        MONTHLY_SUFFIX_MACHINE => FrequencyQuantity::Monthly,
        YEARLY_SUFFIX_MACHINE => FrequencyQuantity::Yearly,
        _ => FrequencyQuantity::Prn,
    }
}

const CLOCK: fsm::State = "CLOCK";
const LEFT_ABBREVIATE: fsm::State = "LEFT_ABBREVIATE";
const LEFT_ABBREVIATE_Q: fsm::State = "LEFT_ABBREVIATE_Q";
const LEFT_ABBREVIATE_O: fsm::State = "LEFT_ABBREVIATE_O";
const LEFT_ABBREVIATE_H: fsm::State = "LEFT_ABBREVIATE_H";
const LEFT_ABBREVIATE_A: fsm::State = "LEFT_ABBREVIATE_A";
const LEFT_ABBREVIATE_P: fsm::State = "LEFT_ABBREVIATE_P";
const LEFT_ABBREVIATE_B: fsm::State = "LEFT_ABBREVIATE_B";
const LEFT_ABBREVIATE_T: fsm::State = "LEFT_ABBREVIATE_T";
const FIRST_DOT_Q: fsm::State = "FIRST_DOT_Q";
const FIRST_DOT_O: fsm::State = "FIRST_DOT_O";
const FIRST_DOT_H: fsm::State = "FIRST_DOT_H";
const FIRST_DOT_A: fsm::State = "FIRST_DOT_A";
const FIRST_DOT_P: fsm::State = "FIRST_DOT_P";
const FIRST_DOT_B: fsm::State = "FIRST_DOT_B";
const FIRST_DOT_T: fsm::State = "FIRST_DOT_T";
const MIDDLE_Q_TO_H: fsm::State = "MIDDLE_Q_TO_H";
const MIDDLE_Q_TO_D: fsm::State = "MIDDLE_Q_TO_D";
const MIDDLE_Q_TO_I: fsm::State = "MIDDLE_Q_TO_I";
const MIDDLE_Q_TO_A: fsm::State = "MIDDLE_Q_TO_A";
const MIDDLE_Q_TO_O: fsm::State = "MIDDLE_Q_TO_O";
const MIDDLE_Q_TO_W: fsm::State = "MIDDLE_Q_TO_W";
const MIDDLE_B_TO_I: fsm::State = "MIDDLE_B_TO_I";
const MIDDLE_T_TO_I: fsm::State = "MIDDLE_T_TO_I";
const SECOND_DOT_Q_TO_H: fsm::State = "SECOND_DOT_Q_TO_H";
const SECOND_DOT_Q_TO_D: fsm::State = "SECOND_DOT_Q_TO_D";
const SECOND_DOT_Q_TO_I: fsm::State = "SECOND_DOT_Q_TO_I";
const SECOND_DOT_Q_TO_A: fsm::State = "SECOND_DOT_Q_TO_A";
const SECOND_DOT_Q_TO_O: fsm::State = "SECOND_DOT_Q_TO_O";
const SECOND_DOT_Q_TO_W: fsm::State = "SECOND_DOT_Q_TO_W";
const SECOND_DOT_B_TO_I: fsm::State = "SECOND_DOT_B_TO_I";
const SECOND_DOT_T_TO_I: fsm::State = "SECOND_DOT_T_TO_I";
const RIGHT_AM: fsm::State = "RIGHT_AM";
const RIGHT_PM: fsm::State = "RIGHT_PM";
const RIGHT_OD: fsm::State = "RIGHT_OD";
const RIGHT_QD: fsm::State = "RIGHT_QD";
const RIGHT_HS: fsm::State = "RIGHT_HS";
const RIGHT_QHS: fsm::State = "RIGHT_QHS";
const RIGHT_QDS: fsm::State = "RIGHT_QDS";
const RIGHT_QID: fsm::State = "RIGHT_QID";
const RIGHT_QAD: fsm::State = "RIGHT_QAD";
const RIGHT_QOD: fsm::State = "RIGHT_QOD";
const RIGHT_QWK: fsm::State = "RIGHT_QWK";
const RIGHT_BID: fsm::State = "RIGHT_BID";
const RIGHT_TID: fsm::State = "RIGHT_TID";
const START_P: fsm::State = "START_P";
const START_P_DOT: fsm::State = "START_P_DOT";
const START_R: fsm::State = "START_R";
const START_R_DOT: fsm::State = "START_R_DOT";
const START_N: fsm::State = "START_N";
const AS_NEEDED: fsm::State = "AS_NEEDED";
const AS_NEEDED_HYPH: fsm::State = "AS_NEEDED_HYPH";
const EOD: fsm::State = "EOD";
const HOUR: fsm::State = "HOUR";
const HANDLE_RANGE: fsm::State = "HANDLE_RANGE";
const HYPH: fsm::State = "HYPH";
const RANGE: fsm::State = "RANGE";
const NUM: fsm::State = "NUM";
const SUFFIX: fsm::State = "SUFFIX";
const FORWARD_SLASH: fsm::State = "FORWARD_SLASH";
const TWELVE_HOUR: fsm::State = "TWELVE_HOUR";

/// All fifteen frequency-unit machines, indexed per the `*_MACHINE` consts.
pub fn frequency_unit_machines(params: &FrequencyUnitParams) -> Vec<Machine<DrugTok>> {
    vec![
        daily_machine(params),
        six_times_a_day_machine(params),
        five_times_a_day_machine(params),
        three_times_a_day_machine(params),
        four_times_a_day_machine(params),
        every_other_hour_machine(params),
        every_other_day_machine(params),
        twice_a_day_machine(params),
        slash_suffix_machine(params.daily_suffix_set.clone()),
        weekly_machine(params),
        slash_suffix_machine(params.hourly_suffix_set.clone()),
        slash_suffix_machine(params.weekly_suffix_set.clone()),
        slash_suffix_machine(params.monthly_suffix_set.clone()),
        slash_suffix_machine(params.yearly_suffix_set.clone()),
        as_needed_machine(params),
    ]
}

fn daily_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let specific = cond::word_set(params.daily_word_set.clone());
    let solo = cond::word_set(params.per_day_word_set.clone());
    let contains_solo = cond::contains_set(params.per_day_word_set.clone());
    let dot = cond::punct_value('.');
    let d = cond::text_value("d");
    let m = cond::text_value("m");
    let s = cond::text_value("s");
    let q = cond::text_value("q");
    let o = cond::text_value("o");
    let h = cond::text_value("h");
    let a = cond::text_value("a");
    let p = cond::text_value("p");
    let bed = cond::text_value("bed");
    let per = cond::text_value("per");
    let time = cond::text_value("time");
    let int1to12 = cond::integer_range(1, 12);

    Machine::new(vec![
        (
            START,
            vec![
                rule(q, LEFT_ABBREVIATE_Q),
                rule(o, LEFT_ABBREVIATE_O),
                rule(h.clone(), LEFT_ABBREVIATE_H),
                rule(int1to12, CLOCK),
                rule(variant::time(), END),
                rule(bed, LEFT_ABBREVIATE),
                rule(per, LEFT_ABBREVIATE),
                rule(specific.clone(), END),
                rule(solo, END),
                rule(contains_solo, END),
                rule(cond::any(), START),
            ],
        ),
        (
            CLOCK,
            vec![
                rule(a, LEFT_ABBREVIATE_A),
                rule(p, LEFT_ABBREVIATE_P),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE,
            vec![rule(specific, END), rule(time, END), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE_Q,
            vec![rule(dot.clone(), FIRST_DOT_Q), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE_O,
            vec![rule(dot.clone(), FIRST_DOT_O), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE_H,
            vec![rule(dot.clone(), FIRST_DOT_H), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_Q,
            vec![
                rule(d.clone(), RIGHT_QD),
                rule(h, MIDDLE_Q_TO_H),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DOT_O,
            vec![rule(d, RIGHT_OD), rule(cond::any(), START)],
        ),
        (
            MIDDLE_Q_TO_H,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_H), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE_A,
            vec![rule(dot.clone(), FIRST_DOT_A), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE_P,
            vec![rule(dot.clone(), FIRST_DOT_P), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_A,
            vec![rule(m.clone(), RIGHT_AM), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_P,
            vec![rule(m, RIGHT_PM), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_H,
            vec![rule(s.clone(), RIGHT_QHS), rule(cond::any(), START)],
        ),
        (
            RIGHT_AM,
            vec![rule(dot.clone(), END), rule(cond::any(), START)],
        ),
        (
            RIGHT_PM,
            vec![rule(dot.clone(), END), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_H,
            vec![rule(s, RIGHT_HS), rule(cond::any(), START)],
        ),
        (
            RIGHT_OD,
            vec![rule(dot.clone(), END), rule(cond::any(), START)],
        ),
        (
            RIGHT_QD,
            vec![rule(dot.clone(), END), rule(cond::any(), START)],
        ),
        (RIGHT_HS, vec![rule(dot, END), rule(cond::any(), START)]),
        (RIGHT_QHS, vec![rule(cond::any(), START)]),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn six_times_a_day_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let six_times = cond::word_set(params.six_times_per_day_word_set.clone());
    let post_four = cond::word_set(params.post_four_word_set.clone());
    let hourly_suffix = cond::word_set(params.hourly_suffix_set.clone());
    let dot = cond::punct_value('.');
    let dash = cond::punct_value('-');
    let d = cond::text_value("d");
    let s = cond::text_value("s");
    let to = cond::text_value("to");
    let four = cond::text_value("four");
    let five = cond::text_value("five");
    let six = cond::text_value("six");
    let seven = cond::text_value("seven");
    let eight = cond::text_value("eight");
    let int5to8 = cond::integer_range(5, 8);
    let int1to3 = cond::integer_range(1, 3);
    let int4 = cond::integer_value(4);
    let comb = cond::combine(vec![cond::negate(int1to3), cond::number()]);
    let disj1 = cond::disjoint(vec![comb, cond::integer_value(4)]);
    let disj2 = cond::disjoint(vec![post_four, four]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(six_times, END),
                rule(int4, HOUR),
                rule(disj1, HANDLE_RANGE),
                rule(disj2, HOUR),
                rule(cond::any(), START),
            ],
        ),
        (
            HANDLE_RANGE,
            vec![rule(dash.clone(), HYPH), rule(cond::any(), START)],
        ),
        (
            HOUR,
            vec![
                rule(dash, HYPH),
                rule(to, HYPH),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DOT_Q,
            vec![rule(d, MIDDLE_Q_TO_D), rule(cond::any(), START)],
        ),
        (
            HYPH,
            vec![
                rule(int5to8, NUM),
                rule(five, NUM),
                rule(six, NUM),
                rule(seven, NUM),
                rule(eight, NUM),
                rule(cond::any(), START),
            ],
        ),
        (
            NUM,
            vec![rule(hourly_suffix, END), rule(cond::any(), START)],
        ),
        (
            MIDDLE_Q_TO_D,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_D), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_D,
            vec![rule(s, RIGHT_QDS), rule(cond::any(), START)],
        ),
        (
            RIGHT_QDS,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn five_times_a_day_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let six_times = cond::word_set(params.six_times_per_day_word_set.clone());
    let hourly_suffix = cond::word_set(params.hourly_suffix_set.clone());
    let dash = cond::punct_value('-');
    let five = cond::text_value("five");
    let int1to4 = cond::integer_range(1, 4);
    let int5to10 = cond::integer_range(5, 10);
    let int5 = cond::integer_value(5);
    let comb = cond::combine(vec![cond::negate(int1to4), int5.clone()]);
    let disj = cond::disjoint(vec![comb, cond::integer_value(4)]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(six_times, END),
                rule(disj, HANDLE_RANGE),
                rule(int5, HOUR),
                rule(five, HOUR),
                rule(cond::any(), START),
            ],
        ),
        (
            HANDLE_RANGE,
            vec![rule(dash, HYPH), rule(cond::any(), START)],
        ),
        (
            HOUR,
            vec![rule(hourly_suffix, END), rule(cond::any(), START)],
        ),
        (
            HYPH,
            vec![rule(int5to10, HOUR), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn three_times_a_day_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let three_times = cond::word_set(params.three_times_a_day_word_set.clone());
    let post_eight = cond::word_set(params.post_eight_word_set.clone());
    let hourly_suffix = cond::word_set(params.hourly_suffix_set.clone());
    let dot = cond::punct_value('.');
    let dash = cond::punct_value('-');
    let t = cond::text_value("t");
    let q = cond::text_value("q");
    let to = cond::text_value("to");
    let ten = cond::text_value("ten");
    let nine = cond::text_value("nine");
    let i = cond::text_value("i");
    let eight = cond::text_value("eight");
    let d = cond::text_value("d");
    let int8 = cond::integer_value(8);
    let num9to10 = cond::integer_range(9, 10);
    let comb = cond::combine(vec![cond::negate(cond::integer_range(1, 7)), cond::number()]);
    let disj1 = cond::disjoint(vec![comb, cond::integer_value(8)]);
    let disj2 = cond::disjoint(vec![post_eight, eight]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(t, LEFT_ABBREVIATE_T),
                rule(q, HOUR),
                rule(int8, HOUR),
                rule(three_times, END),
                rule(disj1, HANDLE_RANGE),
                rule(disj2, HOUR),
                rule(cond::any(), START),
            ],
        ),
        (
            HANDLE_RANGE,
            vec![rule(dash.clone(), HYPH), rule(cond::any(), START)],
        ),
        (
            HOUR,
            vec![
                rule(dash, HYPH),
                rule(to, HYPH),
                rule(hourly_suffix.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_T,
            vec![rule(dot.clone(), FIRST_DOT_T), rule(cond::any(), START)],
        ),
        (
            HYPH,
            vec![
                rule(num9to10, RANGE),
                rule(ten, RANGE),
                rule(nine, RANGE),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DOT_T,
            vec![rule(i, MIDDLE_T_TO_I), rule(cond::any(), START)],
        ),
        (
            RANGE,
            vec![rule(hourly_suffix, END), rule(cond::any(), START)],
        ),
        (
            MIDDLE_T_TO_I,
            vec![rule(dot.clone(), SECOND_DOT_T_TO_I), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_T_TO_I,
            vec![rule(d, RIGHT_TID), rule(cond::any(), START)],
        ),
        (
            RIGHT_TID,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn four_times_a_day_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let four_times = cond::word_set(params.four_times_per_day_word_set.clone());
    let post_six = cond::word_set(params.post_six_word_set.clone());
    let hourly_suffix = cond::word_set(params.hourly_suffix_set.clone());
    let dot = cond::punct_value('.');
    let dash = cond::punct_value('-');
    let d = cond::text_value("d");
    let i = cond::text_value("i");
    let s = cond::text_value("s");
    let q = cond::text_value("q");
    let to = cond::text_value("to");
    let six = cond::text_value("six");
    let seven = cond::text_value("seven");
    let eight = cond::text_value("eight");
    let nine = cond::text_value("nine");
    let ten = cond::text_value("ten");
    let int7to10 = cond::integer_range(7, 10);
    let int6 = cond::integer_value(6);
    let comb = cond::combine(vec![cond::negate(cond::integer_range(1, 5)), cond::number()]);
    let disj1 = cond::disjoint(vec![comb, cond::integer_value(6)]);
    let disj2 = cond::disjoint(vec![post_six, six.clone()]);

    Machine::new(vec![
        (
            START,
            vec![
                rule(q, LEFT_ABBREVIATE_Q),
                rule(four_times.clone(), END),
                rule(int6, HOUR),
                rule(disj1, HANDLE_RANGE),
                rule(disj2, HOUR),
                rule(cond::any(), START),
            ],
        ),
        (
            HANDLE_RANGE,
            vec![rule(dash.clone(), HYPH), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE_Q,
            vec![
                rule(dot.clone(), FIRST_DOT_Q),
                rule(six, HOUR),
                rule(cond::integer_value(6), HOUR),
                rule(four_times.clone(), HOUR),
                rule(cond::any(), START),
            ],
        ),
        (
            HYPH,
            vec![
                rule(int7to10, SUFFIX),
                rule(seven, SUFFIX),
                rule(eight, SUFFIX),
                rule(nine, SUFFIX),
                rule(ten, SUFFIX),
                rule(cond::any(), START),
            ],
        ),
        (
            SUFFIX,
            vec![rule(hourly_suffix.clone(), END), rule(cond::any(), START)],
        ),
        (
            HOUR,
            vec![
                rule(dash, HYPH),
                rule(to, HYPH),
                rule(hourly_suffix, END),
                rule(four_times, END),
                rule(cond::any(), START),
            ],
        ),
        (
            FIRST_DOT_Q,
            vec![
                rule(d, MIDDLE_Q_TO_D),
                rule(i, MIDDLE_Q_TO_I),
                rule(cond::any(), START),
            ],
        ),
        (
            MIDDLE_Q_TO_D,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_D), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_D,
            vec![rule(s, RIGHT_QDS), rule(cond::any(), START)],
        ),
        (
            MIDDLE_Q_TO_I,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_I), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_I,
            vec![rule(cond::text_value("d"), RIGHT_QID), rule(cond::any(), START)],
        ),
        (
            RIGHT_QDS,
            vec![rule(dot.clone(), END), rule(cond::any(), START)],
        ),
        (
            RIGHT_QID,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn every_other_hour_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let every_other_hour = cond::word_set(params.every_other_hour_word_set.clone());
    let dot = cond::punct_value('.');
    let q = cond::text_value("q");
    let o = cond::text_value("o");
    let d = cond::text_value("d");

    Machine::new(vec![
        (
            START,
            vec![
                rule(q, LEFT_ABBREVIATE_Q),
                rule(every_other_hour, END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_Q,
            vec![rule(dot.clone(), FIRST_DOT_Q), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_Q,
            vec![rule(o, MIDDLE_Q_TO_O), rule(cond::any(), START)],
        ),
        (
            MIDDLE_Q_TO_O,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_O), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_O,
            vec![rule(d, RIGHT_QOD), rule(cond::any(), START)],
        ),
        (
            RIGHT_QOD,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn every_other_day_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let eod = cond::word_set(params.every_other_day_word_set.clone());
    let daily = cond::word_set(params.daily_word_set.clone());
    let dot = cond::punct_value('.');
    let q = cond::text_value("q");
    let every_other = cond::text_value("every-other");
    let a = cond::text_value("a");
    let d = cond::text_value("d");

    Machine::new(vec![
        (
            START,
            vec![
                rule(q, LEFT_ABBREVIATE_Q),
                rule(eod, END),
                rule(every_other, EOD),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_Q,
            vec![rule(dot.clone(), FIRST_DOT_Q), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_Q,
            vec![rule(a, MIDDLE_Q_TO_A), rule(cond::any(), START)],
        ),
        (
            MIDDLE_Q_TO_A,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_A), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_A,
            vec![rule(d, RIGHT_QAD), rule(cond::any(), START)],
        ),
        (EOD, vec![rule(daily, END), rule(cond::any(), START)]),
        (
            RIGHT_QAD,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn twice_a_day_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let twice = cond::word_set(params.twice_a_day_word_set.clone());
    let hourly_suffix = cond::word_set(params.hourly_suffix_set.clone());
    let dot = cond::punct_value('.');
    let b = cond::text_value("b");
    let q = cond::text_value("q");
    let twelve = cond::text_value("twelve");
    let i = cond::text_value("i");
    let d = cond::text_value("d");
    let int12 = cond::integer_value(12);

    Machine::new(vec![
        (
            START,
            vec![
                rule(b, LEFT_ABBREVIATE_B),
                rule(q, TWELVE_HOUR),
                rule(int12, TWELVE_HOUR),
                rule(twelve, TWELVE_HOUR),
                rule(twice.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            TWELVE_HOUR,
            vec![
                rule(hourly_suffix, END),
                rule(twice, END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_B,
            vec![rule(dot.clone(), FIRST_DOT_B), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_B,
            vec![rule(i, MIDDLE_B_TO_I), rule(cond::any(), START)],
        ),
        (
            MIDDLE_B_TO_I,
            vec![rule(dot.clone(), SECOND_DOT_B_TO_I), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_B_TO_I,
            vec![rule(d, RIGHT_BID), rule(cond::any(), START)],
        ),
        (
            RIGHT_BID,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

/// `/ suffix` machines (daily, hourly, weekly, monthly, yearly): the slash
/// starts the match, the suffix word emits with the slash skipped.
fn slash_suffix_machine(suffix_set: WordSet) -> Machine<DrugTok> {
    let suffix = cond::word_set(suffix_set);
    let forward_slash = cond::punct_value('/');

    Machine::new(vec![
        (
            START,
            vec![rule(forward_slash, FORWARD_SLASH), rule(cond::any(), START)],
        ),
        (
            FORWARD_SLASH,
            vec![rule(suffix, SKIP_FIRST), rule(cond::any(), START)],
        ),
        (SKIP_FIRST, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn weekly_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let solo = cond::word_set(params.per_week_word_set.clone());
    let contains = cond::contains_set(params.per_week_word_set.clone());
    let dot = cond::punct_value('.');
    let q = cond::text_value("q");
    let a = cond::text_value("a");
    let at = cond::text_value("at");
    let per = cond::text_value("per");
    let w = cond::text_value("w");
    let k = cond::text_value("k");

    Machine::new(vec![
        (
            START,
            vec![
                rule(q, LEFT_ABBREVIATE_Q),
                rule(a, LEFT_ABBREVIATE),
                rule(at, LEFT_ABBREVIATE),
                rule(per, LEFT_ABBREVIATE),
                rule(solo, END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE_Q,
            vec![rule(dot.clone(), FIRST_DOT_Q), rule(cond::any(), START)],
        ),
        (
            LEFT_ABBREVIATE,
            vec![rule(contains, END), rule(cond::any(), START)],
        ),
        (
            FIRST_DOT_Q,
            vec![rule(w, MIDDLE_Q_TO_W), rule(cond::any(), START)],
        ),
        (
            MIDDLE_Q_TO_W,
            vec![rule(dot.clone(), SECOND_DOT_Q_TO_W), rule(cond::any(), START)],
        ),
        (
            SECOND_DOT_Q_TO_W,
            vec![rule(k, RIGHT_QWK), rule(cond::any(), START)],
        ),
        (
            RIGHT_QWK,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn as_needed_machine(params: &FrequencyUnitParams) -> Machine<DrugTok> {
    let prn = cond::word_set(params.prn_word_set.clone());
    let dot = cond::punct_value('.');
    let dash = cond::punct_value('-');
    let p = cond::text_value("p");
    let r = cond::text_value("r");
    let n = cond::text_value("n");
    let as_word = cond::text_value("as");
    let needed = cond::text_value("needed");

    Machine::new(vec![
        (
            START,
            vec![
                rule(as_word, AS_NEEDED),
                rule(prn, END),
                rule(p, START_P),
                rule(cond::any(), START),
            ],
        ),
        (
            START_P,
            vec![rule(dot.clone(), START_P_DOT), rule(cond::any(), START)],
        ),
        (
            START_P_DOT,
            vec![rule(r, START_R), rule(cond::any(), START)],
        ),
        (
            START_R,
            vec![rule(dot.clone(), START_R_DOT), rule(cond::any(), START)],
        ),
        (
            START_R_DOT,
            vec![rule(n, START_N), rule(cond::any(), START)],
        ),
        (
            START_N,
            vec![rule(dot, END), rule(cond::any(), START)],
        ),
        (
            AS_NEEDED,
            vec![
                rule(needed.clone(), END),
                rule(dash, AS_NEEDED_HYPH),
                rule(cond::any(), START),
            ],
        ),
        (
            AS_NEEDED_HYPH,
            vec![rule(needed, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

const MID_TERM: fsm::State = "MID_TERM";
const MIDDLE_A_TEXT: fsm::State = "MIDDLE_A_TEXT";
const TERM: fsm::State = "TERM";
const LAST_TEXT: fsm::State = "LAST_TEXT";

/// The frequency machine: keywords, small numbers and ranges followed by
/// middle terms and frequency units.
pub fn frequency_machines(params: &FrequencyParams) -> Vec<Machine<DrugTok>> {
    let middle = cond::word_set(params.middle_term_set.clone());
    let frequency = cond::word_map(params.frequency_set.clone());
    let hyphenated = cond::word_map(params.hyphenated_set.clone());
    let int0to5 = cond::integer_range(0, 5);
    let range_combine = cond::disjoint(vec![variant::range(), variant::range_strength()]);

    vec![Machine::new(vec![
        (
            START,
            vec![
                rule(range_combine, LEFT_ABBREVIATE),
                rule(frequency.clone(), LEFT_ABBREVIATE),
                rule(int0to5, LEFT_ABBREVIATE),
                rule(hyphenated.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            LEFT_ABBREVIATE,
            vec![
                rule(middle.clone(), MIDDLE_A_TEXT),
                rule(cond::number(), MIDDLE_A_TEXT),
                rule(frequency, MID_TERM),
                rule(hyphenated, END),
                rule(variant::frequency_unit(), NT_END),
                rule(cond::any(), START),
            ],
        ),
        (
            MID_TERM,
            vec![rule(middle.clone(), TERM), rule(cond::any(), START)],
        ),
        (
            MIDDLE_A_TEXT,
            vec![
                rule(middle, LAST_TEXT),
                rule(variant::frequency_unit(), NT_END),
                rule(variant::route(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            TERM,
            vec![
                rule(variant::frequency_unit(), NT_FALSE_TERM),
                rule(variant::route(), NT_FALSE_TERM),
                rule(cond::any(), START),
            ],
        ),
        (
            LAST_TEXT,
            vec![
                rule(variant::frequency_unit(), NT_END),
                rule(variant::route(), NT_END),
                rule(cond::any(), START),
            ],
        ),
        (NT_FALSE_TERM, vec![rule(cond::any(), START)]),
        (NT_END, vec![rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])]
}

/// Run the frequency machine and snap each emitted span to the first
/// frequency keyword (or value) inside it, carrying the mapped value.
pub fn run_frequency(
    machines: &[Machine<DrugTok>],
    sent: &Sentence,
    overrides: &[&[DrugTok]],
    words: &FrequencyParams,
) -> Result<Vec<DrugOut>, FsmError> {
    let tokens = DrugTok::from_tokens(&sent.tokens);
    let exits = [
        ExitSpec::terminal(END),
        ExitSpec::back(NT_END, 1),
        ExitSpec::skip_first(NT_FALSE_TERM),
    ];
    let emissions = run_machines(machines, &exits, &tokens, overrides)?;

    // Sorted keyword order keeps the snap deterministic.
    let mut keywords: Vec<(&String, &String)> = words.frequency_set.iter().collect();
    keywords.sort();

    let mut outs = Vec::new();
    for emission in emissions {
        let mut span = Span::new(emission.begin, emission.end, istr(""));
        let Some(text) = span.text_from_sentence(sent) else {
            continue;
        };
        let lower = text.to_lowercase();

        let mut value = String::new();
        let mut snapped = false;
        for (keyword, number) in &keywords {
            if let Some(pos) = lower.find(keyword.as_str()) {
                let rune_offset = lower[..pos].chars().count() as i32;
                span.begin += rune_offset;
                span.end = span.begin + keyword.chars().count() as i32;
                span.text = istr(keyword);
                value = (*number).clone();
                snapped = true;
                break;
            }
            if let Some(pos) = lower.find(number.as_str()) {
                let rune_offset = lower[..pos].chars().count() as i32;
                span.begin += rune_offset;
                span.end = span.begin + number.chars().count() as i32;
                span.text = istr(number);
                value = (*number).clone();
                snapped = true;
                break;
            }
        }
        if !snapped {
            span.text = istr(&lower);
        }

        outs.push(DrugOut {
            span,
            kind: OutKind::Frequency(value),
        });
    }
    Ok(outs)
}
