//! Drug attribute extraction.
//!
//! A battery of token-level finite state machines runs over each sentence
//! holding drug mentions: strength (fraction/range/decimal/suffix/unit),
//! dosage, form, route, frequency (+units), duration, time, change status
//! and sub-section indicators. Several machines consume other machines'
//! outputs as override tokens. The extractor then assigns the first match
//! of each kind inside a drug's attribute window to the drug's `med*`
//! attribute keys.

mod extractor;
mod machines;
mod params;
mod tokens;

use thiserror::Error;

pub use extractor::{DrugAttributesExtractor, MED_ATTRIBUTE_KEYS};
pub use machines::FsmBattery;
pub use params::{word_map, word_set, DrugFsmParams};
pub use tokens::{
    DrugChangeStatus, DrugOut, DrugTok, FormMethod, FrequencyQuantity, OutKind, SubSectionStatus,
};

#[derive(Debug, Error)]
pub enum DrugNerError {
    #[error(transparent)]
    Fsm(#[from] fsm::FsmError),
    #[error("drug mention has no sentence tokens")]
    EmptySentence,
}
