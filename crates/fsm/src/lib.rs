//! Token-level finite state machines.
//!
//! A [`Machine`] maps a state to an ordered rule list; feeding it one token
//! evaluates the rules in declaration order and the first matching condition
//! decides the next state. A trailing [`conditions::any`] rule makes
//! transitions total; a state with no matching rule stays put.
//!
//! The [`driver`] module runs a family of machines over one sentence and
//! implements the override protocol: outputs of earlier machines mask the
//! raw tokens they cover, and the driver remembers how many raw tokens each
//! override swallowed so that emitted spans recover their true start token.

pub mod conditions;
pub mod driver;

use std::collections::HashMap;

use thiserror::Error;

pub use conditions::{Cond, TokenView};
pub use driver::{run_machines, Emission, ExitSpec};

/// Machine state identifier.
pub type State = &'static str;

/// Shared state names. Machines emit on the terminal states; the
/// non-terminal variants adjust the emitted span backwards or forwards by
/// whole tokens.
pub const START: State = "START";
pub const END: State = "END";
pub const NT_END: State = "NON TERMINAL END";
pub const NT_END_HYPH: State = "NON TERMINAL END HYPHEN";
pub const NT_FALSE_TERM: State = "NON TERMINAL FALSE TERM";
pub const SKIP_FIRST: State = "SKIP FIRST";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("no transitions declared for state '{0}'")]
    UnknownState(State),
}

/// One transition rule: when `cond` matches, go to `dst`.
pub struct Rule<T> {
    pub cond: Cond<T>,
    pub dst: State,
}

/// Build a [`Rule`].
pub fn rule<T>(cond: Cond<T>, dst: State) -> Rule<T> {
    Rule { cond, dst }
}

/// A finite state machine over tokens of type `T`.
pub struct Machine<T> {
    states: HashMap<State, Vec<Rule<T>>>,
}

impl<T> Machine<T> {
    pub fn new(states: Vec<(State, Vec<Rule<T>>)>) -> Self {
        Machine {
            states: states.into_iter().collect(),
        }
    }

    /// Feed one token; first matching rule wins, otherwise stay.
    pub fn input(&self, token: &T, current: State) -> Result<State, FsmError> {
        let rules = self
            .states
            .get(current)
            .ok_or(FsmError::UnknownState(current))?;
        for rule in rules {
            if (rule.cond)(token) {
                return Ok(rule.dst);
            }
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::conditions as cond;
    use super::*;
    use annot::{istr, Span, Token};

    fn word(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        let mut token = Token::new(Span::new(begin, end, istr(text)));
        token.is_word = true;
        token
    }

    fn simple_machine() -> Machine<Token> {
        let set: std::collections::HashSet<String> = ["daily".to_string()].into_iter().collect();
        let daily = cond::word_set(std::sync::Arc::new(set));
        Machine::new(vec![
            (START, vec![rule(daily, END), rule(cond::any(), START)]),
            (END, vec![rule(cond::any(), START)]),
        ])
    }

    #[test]
    fn first_matching_rule_wins() {
        let machine = simple_machine();
        let state = machine.input(&word("daily", 0), START).unwrap();
        assert_eq!(state, END);
        let state = machine.input(&word("weekly", 0), START).unwrap();
        assert_eq!(state, START);
    }

    #[test]
    fn unknown_state_is_an_error() {
        let machine = simple_machine();
        assert_eq!(
            machine.input(&word("x", 0), "NO SUCH STATE"),
            Err(FsmError::UnknownState("NO SUCH STATE"))
        );
    }
}
