//! Number-shaped helper FSMs for the lab sequence: ranges, fractions and
//! dates (dates get swallowed, the others become candidate values).

use annot::{istr, shape_of, Sentence, Span, Token};
use fsm::conditions::{self as cond, set_of};
use fsm::{run_machines, rule, ExitSpec, FsmError, Machine, END, START};

const NUMBER: fsm::State = "NUMBER";
const DASH: fsm::State = "DASH";
const NUMERATOR_NUM: fsm::State = "NUMERATOR_NUM";
const FORWARD_SLASH: fsm::State = "FORWARD_SLASH";
const NUMERATOR_TEXT: fsm::State = "NUMERATOR_TEXT";
const LONG_MONTH: fsm::State = "LONG_MONTH";
const SHORT_MONTH: fsm::State = "SHORT_MONTH";
const MONTH: fsm::State = "MONTH";
const DAY: fsm::State = "DAY";
const DOT: fsm::State = "DOT";
const COMMA: fsm::State = "COMMA";
const SEPARATOR_1: fsm::State = "SEPARATOR1";
const SEPARATOR_2: fsm::State = "SEPARATOR2";

fn number_token(sent: &Sentence, begin: i32, end: i32) -> Option<Token> {
    let mut span = Span::new(begin, end, istr(""));
    let text = span.text_from_sentence(sent)?;
    span.text = istr(&text);
    let mut token = Token::new(span);
    token.shape = shape_of(&text);
    token.is_number = true;
    Some(token)
}

fn run_simple(
    machines: &[Machine<Token>],
    sent: &Sentence,
    overrides: &[&[Token]],
) -> Result<Vec<Token>, FsmError> {
    let emissions = run_machines(machines, &[ExitSpec::terminal(END)], &sent.tokens, overrides)?;
    Ok(emissions
        .iter()
        .filter_map(|emission| number_token(sent, emission.begin, emission.end))
        .collect())
}

/// Numeric and spelled ranges: `250-300`, `two-three`.
pub fn range_tokens(sent: &Sentence) -> Result<Vec<Token>, FsmError> {
    let text_number = cond::word_set(set_of(&[
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ]));
    let dash = cond::punct_value('-');

    let machine = Machine::new(vec![
        (
            START,
            vec![
                rule(text_number.clone(), NUMBER),
                rule(cond::number(), NUMBER),
                rule(cond::any(), START),
            ],
        ),
        (
            NUMBER,
            vec![rule(dash, DASH), rule(cond::any(), START)],
        ),
        (
            DASH,
            vec![
                rule(text_number, END),
                rule(cond::number(), END),
                rule(cond::any(), START),
            ],
        ),
        (END, vec![rule(cond::any(), START)]),
    ]);
    run_simple(&[machine], sent, &[])
}

/// Fractions: `1/2`, `one half`, `half`.
pub fn fraction_tokens(sent: &Sentence) -> Result<Vec<Token>, FsmError> {
    let numerator = cond::word_set(set_of(&[
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ]));
    let denominator = cond::word_set(set_of(&[
        "half", "halfs", "third", "thirds", "fourth", "fourths", "fifth", "fifths", "sixth",
        "sixths", "seventh", "sevenths", "eighth", "eighths", "nineths", "nineth", "tenth",
        "tenths",
    ]));
    let fslash = cond::punct_value('/');

    let machine = Machine::new(vec![
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
                rule(fslash, FORWARD_SLASH),
                rule(denominator.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            FORWARD_SLASH,
            vec![rule(cond::number(), END), rule(cond::any(), START)],
        ),
        (
            NUMERATOR_TEXT,
            vec![rule(denominator, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ]);
    run_simple(&[machine], sent, &[])
}

/// Dates in textual and numeric shapes; ranges mask their raw tokens.
/// Overlapping hits collapse to the later one.
pub fn date_tokens(sent: &Sentence, ranges: &[Token]) -> Result<Vec<Token>, FsmError> {
    let machines = [
        long_textual_date_machine(),
        short_textual_date_machine(),
        long_numeric_date_machine(),
        short_numeric_date_machine(),
    ];
    let emissions = run_machines(
        &machines,
        &[ExitSpec::terminal(END)],
        &sent.tokens,
        &[ranges],
    )?;
    let mut out: Vec<Token> = emissions
        .iter()
        .filter_map(|emission| {
            let mut token = number_token(sent, emission.begin, emission.end)?;
            token.is_number = false;
            token.is_word = true;
            Some(token)
        })
        .collect();

    if out.len() > 1 {
        out.sort_by(|a, b| annot::span::span_order(&a.span, &b.span));
        let mut deduplicated = Vec::with_capacity(out.len());
        for i in 0..out.len() - 1 {
            if out[i].span.end < out[i + 1].span.begin {
                deduplicated.push(out[i].clone());
            }
        }
        deduplicated.push(out[out.len() - 1].clone());
        out = deduplicated;
    }
    Ok(out)
}

fn full_months() -> std::sync::Arc<std::collections::HashSet<String>> {
    set_of(&[
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ])
}

fn short_months() -> std::sync::Arc<std::collections::HashSet<String>> {
    set_of(&[
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    ])
}

fn long_textual_date_machine() -> Machine<Token> {
    let full_month = cond::word_set(full_months());
    let short_month = cond::word_set(short_months());
    let day = cond::integer_range(1, 31);
    let year = cond::integer_range(1900, 2100);
    let dot = cond::punct_value('.');
    let comma = cond::punct_value(',');

    Machine::new(vec![
        (
            START,
            vec![
                rule(full_month, LONG_MONTH),
                rule(short_month, SHORT_MONTH),
                rule(cond::any(), START),
            ],
        ),
        (
            LONG_MONTH,
            vec![rule(day.clone(), DAY), rule(cond::any(), START)],
        ),
        (
            SHORT_MONTH,
            vec![
                rule(dot.clone(), DOT),
                rule(day.clone(), DAY),
                rule(cond::any(), START),
            ],
        ),
        (DOT, vec![rule(day, DAY), rule(cond::any(), START)]),
        (
            DAY,
            vec![
                rule(comma, COMMA),
                rule(year.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (COMMA, vec![rule(year, END), rule(cond::any(), START)]),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn short_textual_date_machine() -> Machine<Token> {
    let full_month = cond::word_set(full_months());
    let short_month = cond::word_set(short_months());
    let day = cond::integer_range(1, 31);
    let year = cond::integer_range(1900, 2100);
    let dot = cond::punct_value('.');

    Machine::new(vec![
        (
            START,
            vec![
                rule(full_month, MONTH),
                rule(short_month, MONTH),
                rule(cond::any(), START),
            ],
        ),
        (
            MONTH,
            vec![
                rule(dot, DOT),
                rule(day.clone(), END),
                rule(year.clone(), END),
                rule(cond::any(), START),
            ],
        ),
        (
            DOT,
            vec![rule(day, END), rule(year, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn long_numeric_date_machine() -> Machine<Token> {
    let month = cond::integer_range(1, 12);
    let day = cond::integer_range(1, 31);
    let long_year = cond::integer_range(1900, 2100);
    let short_year = cond::integer_range(0, 99);
    let slash = cond::punct_value('/');
    let dash = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![rule(month, MONTH), rule(cond::any(), START)],
        ),
        (
            MONTH,
            vec![
                rule(slash.clone(), SEPARATOR_1),
                rule(dash.clone(), SEPARATOR_1),
                rule(cond::any(), START),
            ],
        ),
        (
            SEPARATOR_1,
            vec![rule(day, DAY), rule(cond::any(), START)],
        ),
        (
            DAY,
            vec![
                rule(slash, SEPARATOR_2),
                rule(dash, SEPARATOR_2),
                rule(cond::any(), START),
            ],
        ),
        (
            SEPARATOR_2,
            vec![
                rule(long_year, END),
                rule(short_year, END),
                rule(cond::any(), START),
            ],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}

fn short_numeric_date_machine() -> Machine<Token> {
    let month = cond::integer_range(1, 12);
    let day = cond::integer_range(1, 31);
    let slash = cond::punct_value('/');
    let dash = cond::punct_value('-');

    Machine::new(vec![
        (
            START,
            vec![rule(month, MONTH), rule(cond::any(), START)],
        ),
        (
            MONTH,
            vec![
                rule(slash, SEPARATOR_1),
                rule(dash, SEPARATOR_1),
                rule(cond::any(), START),
            ],
        ),
        (
            SEPARATOR_1,
            vec![rule(day, END), rule(cond::any(), START)],
        ),
        (END, vec![rule(cond::any(), START)]),
    ])
}
