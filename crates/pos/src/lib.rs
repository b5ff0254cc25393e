//! Part-of-speech tagging: a maximum-entropy model over contextual features
//! scored with a width-3 beam search over tag sequences.

mod beam;
mod context;
mod model;

use std::collections::{HashMap, HashSet};

use annot::Token;

pub use beam::{BeamSearch, Sequence};
pub use context::ContextGenerator;
pub use model::{EvalParameters, PosModel, PosModelError};

/// Validates candidate outcomes against an optional tag dictionary: when a
/// word is listed, only its listed tags survive.
#[derive(Default)]
pub struct SequenceValidator {
    tag_dictionary: Option<HashMap<String, HashSet<String>>>,
}

impl SequenceValidator {
    pub fn new() -> Self {
        SequenceValidator::default()
    }

    pub fn with_dictionary(tag_dictionary: HashMap<String, HashSet<String>>) -> Self {
        SequenceValidator {
            tag_dictionary: Some(tag_dictionary),
        }
    }

    pub fn valid(&self, index: usize, tokens: &[&Token], outcome: &str) -> bool {
        let Some(dictionary) = &self.tag_dictionary else {
            return true;
        };
        match dictionary.get(&*tokens[index].span.text) {
            Some(tags) => tags.contains(outcome),
            None => true,
        }
    }
}

/// The tagger front-end: model + context generator + beam search.
pub struct Tagger {
    model: PosModel,
    context: ContextGenerator,
    validator: SequenceValidator,
    beam: BeamSearch,
}

impl Tagger {
    pub fn new(model: PosModel) -> Self {
        Tagger {
            model,
            context: ContextGenerator::new(),
            validator: SequenceValidator::new(),
            beam: BeamSearch::new(3),
        }
    }

    /// Tags for `tokens`, best sequence first. Empty when no sequence
    /// survives the beam.
    pub fn tag(&self, tokens: &[&Token]) -> Vec<String> {
        match self.beam.search(tokens, &self.model, &self.context, &self.validator) {
            Some(sequence) => sequence.outcomes,
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests;
