//! Model inference for the annotation pipeline.
//!
//! Three model families, all persisted as JSON numeric tables by the
//! training toolchain (the on-disk format is the stable boundary; loading
//! reshapes into dense arrays):
//!
//! - [`LinearModel`]: liblinear-style maximum-entropy classifier with a
//!   trie-shaped feature-name cache, used by the sentence detector.
//! - [`Crf`]: linear-chain CRF decoded with a Viterbi forward pass and an
//!   A*-style backward recovery, used for lab value linkage.
//! - [`svm`]: libsvm-compatible support vector machine with the standard
//!   kernels, used by the smoking PCS classifier.

pub mod crf;
pub mod feature;
pub mod linear;
pub mod svm;

use std::path::Path;

use thiserror::Error;

pub use crf::Crf;
pub use feature::Feature;
pub use linear::{FeatureValue, LinearModel};
pub use svm::{SvmModel, SvmNode};

#[derive(Debug, Error)]
pub enum MlError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MlError> {
    let buf = std::fs::read(path).map_err(|source| MlError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&buf).map_err(|source| MlError::Malformed {
        path: path.display().to_string(),
        source,
    })
}
