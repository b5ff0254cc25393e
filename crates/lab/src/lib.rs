//! Lab value linkage.
//!
//! Per sentence: split number+unit tokens, build a merged sequence of lab
//! mentions and candidate values (numbers, ranges, fractions, special value
//! words; dates swallowed), extract pairwise features and classify each
//! `(mention, value)` pair with a linear-chain CRF. `LINKED` pairs within
//! the token distance write `labValue` (and `labValueUnit` when the unit
//! prefix tree matches what follows).

mod extractor;
mod machines;
mod units;

use thiserror::Error;

pub use extractor::{LabValuesExtractor, ATTR_LAB_VALUE, ATTR_LAB_VALUE_UNIT};
pub use machines::{date_tokens, fraction_tokens, range_tokens};
pub use units::LabUnits;

#[derive(Debug, Error)]
pub enum LabError {
    #[error(transparent)]
    Model(#[from] ml::MlError),
    #[error(transparent)]
    Fsm(#[from] fsm::FsmError),
    #[error("failed to read lab units {path}: {source}")]
    Units {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lab mention '{text}' [{begin}:{end}] has no sentence tokens")]
    EmptySentence { text: String, begin: i32, end: i32 },
}
