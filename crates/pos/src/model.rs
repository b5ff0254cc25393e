//! POS maxent model: outcome-indexed context parameters with softmax
//! evaluation.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosModelError {
    #[error("failed to read POS model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed POS model {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parameters of one context predicate: the outcomes it scores and their
/// weights, parallel arrays.
#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "Outcomes")]
    pub outcomes: Vec<usize>,
    #[serde(rename = "Parameters")]
    pub parameters: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalParameters {
    pub params: Vec<Context>,
    #[serde(rename = "numOfOutcomes")]
    pub num_of_outcomes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PosModel {
    pub probs: Vec<f64>,
    pub outcomes: Vec<String>,
    #[serde(rename = "pmap")]
    pub predicate_map: HashMap<String, usize>,
    #[serde(rename = "evalParams")]
    pub eval_params: EvalParameters,
}

impl PosModel {
    pub fn load(path: &Path) -> Result<Self, PosModelError> {
        let buf = std::fs::read(path).map_err(|source| PosModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&buf).map_err(|source| PosModelError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    /// Softmax distribution over outcomes for one context set.
    pub fn eval(&self, context: &[String]) -> Vec<f64> {
        let mut outsums = self.probs.clone();
        outsums.resize(self.eval_params.num_of_outcomes, 0.0);

        for name in context {
            let Some(predicate) = self.predicate_map.get(name) else {
                continue;
            };
            let params = &self.eval_params.params[*predicate];
            for (slot, outcome) in params.outcomes.iter().enumerate() {
                outsums[*outcome] += params.parameters[slot];
            }
        }

        let mut normal = 0.0;
        for value in outsums.iter_mut() {
            *value = value.exp();
            normal += *value;
        }
        for value in outsums.iter_mut() {
            *value /= normal;
        }
        outsums
    }
}
