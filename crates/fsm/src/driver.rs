//! Driver running a family of machines over one sentence, with override
//! merging.
//!
//! Overrides are spans produced by earlier FSMs. While the raw cursor sits
//! inside an override span, the override token is fed to the machines once
//! (at the raw token whose begin equals the override's begin) and the raw
//! tokens underneath are skipped. The driver counts how many raw tokens each
//! override swallowed, keyed by the anchor token's begin offset, so that a
//! later emission whose recorded start falls on the anchor can shift its
//! start index past the swallowed tokens.

use annot::HasSpan;

use crate::conditions::TokenView;
use crate::{FsmError, Machine, State, START};

/// How one terminal state turns into an emission.
#[derive(Debug, Clone, Copy)]
pub struct ExitSpec {
    pub state: State,
    /// How many raw tokens before the current one the emitted span ends at
    /// (0 = the current, possibly overridden, token).
    pub end_back: usize,
    /// Start the emitted span one token after the matched start.
    pub skip_first: bool,
    /// With `end_back == 1`: back off one more raw token when the previous
    /// raw token is punctuation.
    pub punct_back_off: bool,
}

impl ExitSpec {
    pub fn terminal(state: State) -> Self {
        ExitSpec {
            state,
            end_back: 0,
            skip_first: false,
            punct_back_off: false,
        }
    }

    pub fn back(state: State, end_back: usize) -> Self {
        ExitSpec {
            state,
            end_back,
            skip_first: false,
            punct_back_off: false,
        }
    }

    pub fn skip_first(state: State) -> Self {
        ExitSpec {
            state,
            end_back: 0,
            skip_first: true,
            punct_back_off: false,
        }
    }
}

/// One emitted match.
#[derive(Debug, Clone)]
pub struct Emission {
    pub machine: usize,
    pub state: State,
    /// Raw token index the match starts at (override shifts applied).
    pub start_index: usize,
    pub begin: i32,
    pub end: i32,
}

struct OverrideSet<'a, T> {
    by_begin: std::collections::HashMap<i32, &'a T>,
    swallowed: std::collections::HashMap<i32, usize>,
    active: bool,
    end_offset: i32,
    anchor: i32,
    raw_count: usize,
}

impl<'a, T: TokenView> OverrideSet<'a, T> {
    fn new(tokens: &'a [T]) -> Self {
        OverrideSet {
            by_begin: tokens.iter().map(|t| (t.span().begin, t)).collect(),
            swallowed: std::collections::HashMap::new(),
            active: false,
            end_offset: -1,
            anchor: 0,
            raw_count: 0,
        }
    }
}

/// Run `machines` over the sentence tokens with zero or more override sets,
/// reporting matches through the exit specs. `tokens` are the raw sentence
/// tokens converted into the domain token type; each override set likewise.
pub fn run_machines<T: TokenView>(
    machines: &[Machine<T>],
    exits: &[ExitSpec],
    tokens: &[T],
    overrides: &[&[T]],
) -> Result<Vec<Emission>, FsmError> {
    let mut emissions = Vec::new();
    let mut states: Vec<State> = vec![START; machines.len()];
    let mut start_map: Vec<Option<usize>> = vec![None; machines.len()];
    let mut sets: Vec<OverrideSet<'_, T>> = overrides.iter().map(|set| OverrideSet::new(set)).collect();

    for (i, raw) in tokens.iter().enumerate() {
        // At most one override may stay active; the one reaching further is
        // cancelled without recording its swallow count.
        loop {
            let active: Vec<usize> = (0..sets.len()).filter(|k| sets[*k].active).collect();
            if active.len() < 2 {
                break;
            }
            let (a, b) = (active[0], active[1]);
            if sets[a].end_offset >= sets[b].end_offset {
                sets[a].active = false;
            } else {
                sets[b].active = false;
            }
        }

        let mut presented: &T = raw;
        let mut just_expired = false;
        if let Some(k) = (0..sets.len()).find(|k| sets[*k].active) {
            if raw.span().begin >= sets[k].end_offset {
                let anchor = sets[k].anchor;
                let count = sets[k].raw_count;
                if count > 0 {
                    sets[k].swallowed.insert(anchor, count);
                }
                sets[k].active = false;
                sets[k].end_offset = -1;
                just_expired = true;
            } else {
                sets[k].raw_count += 1;
                continue;
            }
        }
        // No fresh activation on the token an override just expired at.
        if !just_expired {
            for set in sets.iter_mut() {
                if let Some(over) = set.by_begin.get(&raw.span().begin) {
                    presented = *over;
                    set.active = true;
                    set.anchor = raw.span().begin;
                    set.end_offset = over.span().end;
                    set.raw_count = 0;
                }
            }
        }

        for (m, machine) in machines.iter().enumerate() {
            let next = machine.input(presented, states[m])?;
            states[m] = next;

            if next == START {
                start_map[m] = Some(i);
                for set in sets.iter_mut() {
                    set.raw_count = 0;
                }
            }

            let Some(exit) = exits.iter().find(|spec| spec.state == next) else {
                continue;
            };

            let start_index = match start_map[m] {
                Some(recorded) => {
                    let anchor_begin = tokens[recorded].span().begin;
                    let shift: usize = sets
                        .iter()
                        .map(|set| set.swallowed.get(&anchor_begin).copied().unwrap_or(0))
                        .sum();
                    recorded + shift + 1
                }
                None => 0,
            };
            let start_index = if exit.skip_first { start_index + 1 } else { start_index };

            let Some(start_token) = tokens.get(start_index) else {
                states[m] = START;
                continue;
            };

            let end = match exit.end_back {
                0 => Some(presented.span().end),
                back => {
                    let mut idx = i.checked_sub(back);
                    if exit.punct_back_off {
                        if let Some(prev) = idx.and_then(|idx| tokens.get(idx)) {
                            if prev.is_punct() {
                                idx = i.checked_sub(back + 1);
                            }
                        }
                    }
                    idx.and_then(|idx| tokens.get(idx)).map(|t| t.span().end)
                }
            };
            let Some(end) = end else {
                states[m] = START;
                continue;
            };

            emissions.push(Emission {
                machine: m,
                state: next,
                start_index,
                begin: start_token.span().begin,
                end,
            });
            states[m] = START;
        }
    }

    Ok(emissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::{self as cond, set_of};
    use crate::{rule, END, NT_END};
    use annot::{istr, Span, Token};

    fn word(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        let mut t = Token::new(Span::new(begin, end, istr(text)));
        t.is_word = true;
        t
    }

    fn number(text: &str, begin: i32) -> Token {
        let mut t = word(text, begin);
        t.is_word = false;
        t.is_number = true;
        t
    }

    fn simple_tokens() -> Vec<Token> {
        // "take two daily now"
        vec![word("take", 0), word("two", 5), word("daily", 9), word("now", 15)]
    }

    fn daily_machine() -> Machine<Token> {
        Machine::new(vec![
            (START, vec![rule(cond::word_set(set_of(&["two"])), "NUM"), rule(cond::any(), START)]),
            ("NUM", vec![rule(cond::word_set(set_of(&["daily"])), END), rule(cond::any(), START)]),
            (END, vec![rule(cond::any(), START)]),
        ])
    }

    #[test]
    fn emits_span_from_match_start_to_current() {
        let machines = [daily_machine()];
        let tokens = simple_tokens();
        let out = run_machines(&machines, &[ExitSpec::terminal(END)], &tokens, &[]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_index, 1);
        assert_eq!((out[0].begin, out[0].end), (5, 14));
    }

    #[test]
    fn nt_end_backs_off_one_token() {
        // Machine reaches NT_END on the token *after* the interesting one.
        let machine = Machine::new(vec![
            (START, vec![rule(cond::word_set(set_of(&["daily"])), "HIT"), rule(cond::any(), START)]),
            ("HIT", vec![rule(cond::any(), NT_END)]),
            (NT_END, vec![rule(cond::any(), START)]),
        ]);
        let tokens = simple_tokens();
        let out = run_machines(&[machine], &[ExitSpec::back(NT_END, 1)], &tokens, &[]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].begin, out[0].end), (9, 14));
    }

    #[test]
    fn override_masks_raw_tokens_and_recovers_start() {
        // "give 40 - 60 mg": the range override covers "40 - 60" (3 raw
        // tokens) and the machine sees it as one number-ish span.
        let tokens = vec![
            word("give", 0),
            number("40", 5),
            {
                let mut dash = Token::new(Span::new(8, 9, istr("-")));
                dash.is_punct = true;
                dash
            },
            number("60", 10),
            word("mg", 13),
        ];
        let range = Token::new(Span::new(5, 12, istr("40 - 60")));
        let overrides: Vec<Token> = vec![range];

        // Matches an override span (not number, not word) followed by "mg".
        let not_raw: crate::Cond<Token> = std::sync::Arc::new(|t: &Token| t.span().len() == 7);
        let machine = Machine::new(vec![
            (START, vec![rule(not_raw, "RANGE"), rule(cond::any(), START)]),
            ("RANGE", vec![rule(cond::word_set(set_of(&["mg"])), END), rule(cond::any(), START)]),
            (END, vec![rule(cond::any(), START)]),
        ]);

        let out = run_machines(
            &[machine],
            &[ExitSpec::terminal(END)],
            &tokens,
            &[overrides.as_slice()],
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        // Start resolves to the raw "40" token, end to "mg".
        assert_eq!(out[0].start_index, 1);
        assert_eq!((out[0].begin, out[0].end), (5, 15));
    }
}
