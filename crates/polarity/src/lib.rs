//! Polarity (negation) detection.
//!
//! For each mention, collect up to `max_left` tokens to the left and
//! `max_right` tokens to the right, stopping early at boundary tokens, and
//! feed the window (plus a synthetic `<EOS>`) to four machines in parallel:
//! aspectual, nominal, adjectival and correction-adjectival negation. Any
//! machine reaching a terminal state makes the mention negative.

mod machines;
mod sets;

use std::collections::HashSet;

use annot::{istr, Annotation, Polarity, Scope, Span, Token};
use fsm::{FsmError, Machine, END, NT_END, START};
use once_cell::sync::Lazy;
use thiserror::Error;

pub use sets::default_boundaries;

#[derive(Debug, Error)]
pub enum PolarityError {
    #[error(transparent)]
    Fsm(#[from] FsmError),
    #[error("polarity analyzer: sentence contains no tokens for '{0}'")]
    NoTokens(String),
}

static EOS_TEXT: Lazy<annot::IStr> = Lazy::new(|| istr("<EOS>"));

fn eos_token() -> Token {
    Token::new(Span::new(0, 0, EOS_TEXT.clone()))
}

/// The negation machine set over one context window.
pub struct PolarityFsm {
    machines: Vec<Machine<Token>>,
}

impl Default for PolarityFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityFsm {
    pub fn new() -> Self {
        PolarityFsm {
            machines: vec![
                machines::aspectual_machine(),
                machines::nominal_machine(),
                machines::adjectival_machine(),
                machines::correction_adjectival_machine(),
            ],
        }
    }

    /// Whether the window carries a negation.
    pub fn negated(&self, tokens: &[&Token]) -> Result<bool, FsmError> {
        let mut states: Vec<fsm::State> = vec![START; self.machines.len()];
        for token in tokens {
            for (idx, machine) in self.machines.iter().enumerate() {
                states[idx] = machine.input(token, states[idx])?;
                if states[idx] == END || states[idx] == NT_END {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// The analyzer: window collection plus the machine set.
pub struct PolarityAnalyzer {
    max_left: usize,
    max_right: usize,
    boundaries: HashSet<String>,
    fsm: PolarityFsm,
}

impl PolarityAnalyzer {
    pub fn new(max_left: usize, max_right: usize, boundaries: HashSet<String>) -> Self {
        PolarityAnalyzer {
            max_left,
            max_right,
            boundaries,
            fsm: PolarityFsm::new(),
        }
    }

    fn is_boundary(&self, token: &Token) -> bool {
        self.boundaries.contains(&*token.span.text)
    }

    /// Polarity per annotation, scanning the requested scopes.
    pub fn analyze(
        &self,
        annotations: &[Annotation],
        scopes: &[Scope],
    ) -> Result<Vec<Polarity>, PolarityError> {
        let mut polarities = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let mut polarity = Polarity::Positive;
            for scope in scopes {
                let window = self.scope_tokens(annotation, *scope)?;
                let refs: Vec<&Token> = window.iter().collect();
                if self.fsm.negated(&refs)? {
                    polarity = Polarity::Negative;
                }
            }
            polarities.push(polarity);
        }
        Ok(polarities)
    }

    /// Window tokens for one scope, boundary-limited, `<EOS>` appended.
    fn scope_tokens(&self, annotation: &Annotation, scope: Scope) -> Result<Vec<Token>, PolarityError> {
        let tokens = &annotation.sentence.tokens;
        if tokens.is_empty() {
            return Err(PolarityError::NoTokens(annotation.span.text.to_string()));
        }

        let mut start_idx: Option<usize> = None;
        let mut end_idx: Option<usize> = None;
        for (idx, token) in tokens.iter().enumerate() {
            if start_idx.is_none() && token.span.begin >= annotation.span.begin {
                start_idx = Some(idx);
            }
            if token.span.begin >= annotation.span.begin && token.span.end <= annotation.span.end {
                end_idx = Some(idx);
            }
        }

        let mut window = match scope {
            Scope::Left => {
                let mut window = Vec::with_capacity(self.max_left + 1);
                if let Some(start) = start_idx {
                    for token in tokens[..start].iter().rev() {
                        if window.len() >= self.max_left || self.is_boundary(token) {
                            break;
                        }
                        window.push(token.clone());
                    }
                }
                window.reverse();
                window
            }
            Scope::Right => {
                let mut window = Vec::with_capacity(self.max_right + 1);
                if let Some(end) = end_idx {
                    for token in tokens.iter().skip(end + 1) {
                        if window.len() >= self.max_right || self.is_boundary(token) {
                            break;
                        }
                        window.push(token.clone());
                    }
                }
                window
            }
        };
        window.push(eos_token());
        Ok(window)
    }
}

#[cfg(test)]
mod tests;
