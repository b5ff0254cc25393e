//! Liblinear-style maximum-entropy model with a trie feature cache.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::MlError;

/// One active feature: 1-based index into the weight matrix plus its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureValue {
    pub index: usize,
    pub value: f64,
}

/// Node of the feature-name trie. A feature name is a sequence of string
/// parts; `value` < 0 marks an interior node without an index of its own.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CacheNode {
    #[serde(rename = "v", default)]
    pub value: i64,
    #[serde(rename = "i", default)]
    pub inner: HashMap<String, CacheNode>,
}

/// Linear model as persisted by the trainer.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub bias: f64,
    #[serde(rename = "weights")]
    pub w: Vec<f64>,
    pub labels: Vec<u8>,
    pub features_len: usize,
    pub features_cache: HashMap<String, CacheNode>,
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self, MlError> {
        crate::load_json(path)
    }

    /// Resolve a feature name (as parts) to its weight index.
    pub fn feature_index(&self, parts: &[&str]) -> Option<usize> {
        let mut level = &self.features_cache;
        let mut node: Option<&CacheNode> = None;
        for part in parts {
            let found = level.get(*part)?;
            level = &found.inner;
            node = Some(found);
        }
        let node = node?;
        if node.value < 0 {
            return None;
        }
        Some(node.value as usize)
    }

    /// Predict the label for a sparse binary feature vector.
    pub fn predict(&self, features: &[FeatureValue]) -> u8 {
        let mut n = self.features_len;
        if self.bias >= 0.0 {
            n += 1;
        }

        let nr_w = if self.labels.len() == 2 { 1 } else { self.labels.len() };
        let mut dec_values = vec![0.0f64; self.labels.len()];

        for feat in features {
            if feat.index <= n {
                for i in 0..nr_w {
                    dec_values[i] += self.w[(feat.index - 1) * nr_w + i] * feat.value;
                }
            }
        }

        if self.labels.len() == 2 {
            let idx = if dec_values[0] > 0.0 { 0 } else { 1 };
            self.labels[idx]
        } else {
            let mut best = 0usize;
            for i in 0..self.labels.len() {
                if dec_values[i] > dec_values[best] {
                    best = i;
                }
            }
            self.labels[best]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model_json() -> &'static str {
        // 3 labels, 2 features; weights laid out feature-major.
        r#"{
            "bias": -1.0,
            "weights": [1.0, 0.0, -1.0, 0.0, 2.0, 0.5],
            "labels": [1, 2, 3],
            "features_len": 2,
            "features_cache": {
                "Token": {"v": -1, "i": {"cap": {"v": 1, "i": {}}}},
                "PrevOutcome": {"v": 2, "i": {}}
            }
        }"#
    }

    fn load_model() -> LinearModel {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(model_json().as_bytes()).unwrap();
        LinearModel::load(file.path()).unwrap()
    }

    #[test]
    fn feature_index_walks_the_trie() {
        let model = load_model();
        assert_eq!(model.feature_index(&["Token", "cap"]), Some(1));
        assert_eq!(model.feature_index(&["PrevOutcome"]), Some(2));
        // Interior node has no index of its own.
        assert_eq!(model.feature_index(&["Token"]), None);
        assert_eq!(model.feature_index(&["Token", "missing"]), None);
    }

    #[test]
    fn predict_picks_highest_scoring_label() {
        let model = load_model();
        // Feature 1 alone: scores (1, 0, -1) → label 1.
        let out = model.predict(&[FeatureValue { index: 1, value: 1.0 }]);
        assert_eq!(out, 1);
        // Feature 2 alone: scores (0, 2, 0.5) → label 2.
        let out = model.predict(&[FeatureValue { index: 2, value: 1.0 }]);
        assert_eq!(out, 2);
    }
}
