//! Linear-chain CRF: Viterbi forward lattice plus an A*-style backward
//! recovery of the best label sequence.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;

use crate::feature::Feature;
use crate::MlError;

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionData {
    pub weights: Vec<f64>,
    pub default_weight: f64,
}

/// CRF model as persisted by the trainer: feature-name → index, a state
/// list, initial/final weights and a dense `from × to` transition table.
#[derive(Debug, Clone, Deserialize)]
pub struct Crf {
    pub features: HashMap<String, usize>,
    pub states: Vec<String>,
    pub initial_weights: Vec<f64>,
    pub final_weights: Vec<f64>,
    pub transitions: Vec<Vec<TransitionData>>,
}

struct PathNode {
    level: usize,
    state: usize,
    cost: f64,
    priority: f64,
    parent: Option<Rc<PathNode>>,
}

impl Crf {
    /// Load a model, padding absent initial weights with −∞ so states the
    /// trainer never saw as sentence-initial stay unreachable.
    pub fn load(path: &Path) -> Result<Self, MlError> {
        let mut model: Crf = crate::load_json(path)?;
        while model.initial_weights.len() < model.states.len() {
            model.initial_weights.push(f64::NEG_INFINITY);
        }
        Ok(model)
    }

    fn feature_indices(&self, features: &[Feature]) -> Vec<usize> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for feature in features {
            if let Some(idx) = self.features.get(&feature.key()) {
                if seen.insert(*idx) {
                    out.push(*idx);
                }
            }
        }
        out
    }

    fn transition_weight(&self, from: usize, to: usize, feature_idx: &[usize]) -> f64 {
        let transition = &self.transitions[from][to];
        let mut sum = transition.default_weight;
        for idx in feature_idx {
            if let Some(w) = transition.weights.get(*idx) {
                sum += w;
            }
        }
        sum
    }

    fn viterbi(&self, observations: &[Vec<usize>]) -> Vec<Vec<f64>> {
        let n_states = self.states.len();
        let mut delta = vec![vec![f64::NEG_INFINITY; n_states]; observations.len() + 1];
        delta[0].clone_from(&self.initial_weights);

        for (t, feature_idx) in observations.iter().enumerate() {
            for from in 0..n_states {
                if delta[t][from] == f64::NEG_INFINITY {
                    continue;
                }
                for to in 0..n_states {
                    let mut weight = delta[t][from] + self.transition_weight(from, to, feature_idx);
                    if t == observations.len() - 1 {
                        weight += self.final_weights[to];
                    }
                    if weight > delta[t + 1][to] {
                        delta[t + 1][to] = weight;
                    }
                }
            }
        }
        delta
    }

    fn best_path(&self, observations: &[Vec<usize>], delta: &[Vec<f64>]) -> Option<Vec<usize>> {
        let final_level = observations.len();
        let mut open: Vec<Rc<PathNode>> = (0..self.states.len())
            .filter(|state| delta[final_level][*state] > f64::NEG_INFINITY)
            .map(|state| {
                Rc::new(PathNode {
                    level: final_level,
                    state,
                    cost: 0.0,
                    priority: -delta[final_level][state],
                    parent: None,
                })
            })
            .collect();

        while !open.is_empty() {
            let best = open
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.priority.partial_cmp(&b.priority).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(idx, _)| idx)?;
            let node = open.swap_remove(best);

            if node.level == 0 {
                // Walk back up: parents hold the states for levels 1..=n.
                let mut path = Vec::with_capacity(final_level);
                let mut cursor = node.parent.clone();
                while let Some(current) = cursor {
                    path.push(current.state);
                    cursor = current.parent.clone();
                }
                return Some(path);
            }

            let level = node.level - 1;
            let feature_idx = &observations[level];
            for state in 0..self.states.len() {
                if delta[level][state] == f64::NEG_INFINITY {
                    continue;
                }
                let trans = self.transition_weight(state, node.state, feature_idx);
                let cost = node.cost - trans;
                open.push(Rc::new(PathNode {
                    level,
                    state,
                    cost,
                    priority: -delta[level][state] + cost,
                    parent: Some(Rc::clone(&node)),
                }));
            }
        }
        None
    }

    /// Label each observation (a feature bag per item). Items whose path
    /// cannot be recovered come back as empty strings.
    pub fn predict(&self, features: &[Vec<Feature>]) -> Vec<String> {
        if features.is_empty() {
            return Vec::new();
        }
        let observations: Vec<Vec<usize>> = features.iter().map(|f| self.feature_indices(f)).collect();
        let delta = self.viterbi(&observations);
        let mut result = vec![String::new(); features.len()];
        if let Some(path) = self.best_path(&observations, &delta) {
            for (i, state) in path.into_iter().enumerate() {
                if i < result.len() {
                    result[i] = self.states[state].clone();
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two states, one feature. The feature strongly prefers LINKED; the
    /// default weights prefer OTHER.
    fn tiny_crf() -> Crf {
        Crf {
            features: [("LV_IS_CLOSEST".to_string(), 0usize)].into_iter().collect(),
            states: vec!["OTHER".into(), "LINKED".into()],
            initial_weights: vec![0.0, 0.0],
            final_weights: vec![0.0, 0.0],
            transitions: vec![
                vec![
                    TransitionData { weights: vec![-2.0], default_weight: 1.0 },
                    TransitionData { weights: vec![4.0], default_weight: -1.0 },
                ],
                vec![
                    TransitionData { weights: vec![-2.0], default_weight: 1.0 },
                    TransitionData { weights: vec![4.0], default_weight: -1.0 },
                ],
            ],
        }
    }

    fn closest() -> Vec<Feature> {
        vec![Feature::Bool { name: "LV_IS_CLOSEST", value: true }]
    }

    fn far() -> Vec<Feature> {
        vec![Feature::Int { name: "LV_DISTANCE", value: 9 }]
    }

    #[test]
    fn predicts_feature_driven_states() {
        let crf = tiny_crf();
        let out = crf.predict(&[closest(), far(), closest()]);
        assert_eq!(out, vec!["LINKED", "OTHER", "LINKED"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let crf = tiny_crf();
        assert!(crf.predict(&[]).is_empty());
    }
}
