//! libsvm-compatible SVM inference (classification path).

use std::path::Path;

use serde::Deserialize;

use crate::MlError;

pub const SVM_TYPE_C_SVC: i32 = 0;
pub const SVM_TYPE_NU_SVC: i32 = 1;
pub const SVM_TYPE_ONE_CLASS: i32 = 2;
pub const SVM_TYPE_EPSILON_SVR: i32 = 3;
pub const SVM_TYPE_NU_SVR: i32 = 4;

pub const KERNEL_LINEAR: i32 = 0;
pub const KERNEL_POLY: i32 = 1;
pub const KERNEL_RBF: i32 = 2;
pub const KERNEL_SIGMOID: i32 = 3;
pub const KERNEL_PRECOMPUTED: i32 = 4;

/// Sparse vector entry: 1-based feature index plus value.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct SvmNode {
    #[serde(rename = "index")]
    pub index: i32,
    #[serde(rename = "value")]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SvmParameter {
    #[serde(rename = "svm_type", default)]
    pub svm_type: i32,
    #[serde(rename = "kernel_type", default)]
    pub kernel_type: i32,
    #[serde(default)]
    pub degree: i32,
    #[serde(default)]
    pub gamma: f64,
    #[serde(rename = "coef_0", default)]
    pub coef0: f64,
}

/// SVM model as persisted by the trainer.
#[derive(Debug, Clone, Deserialize)]
pub struct SvmModel {
    pub param: SvmParameter,
    pub nr_class: usize,
    pub l: usize,
    pub sv: Vec<Vec<SvmNode>>,
    pub sv_coef: Vec<Vec<f64>>,
    pub rho: Vec<f64>,
    pub label: Vec<i32>,
    pub nsv: Vec<usize>,
}

fn dot(x: &[SvmNode], y: &[SvmNode]) -> f64 {
    let (mut i, mut j, mut sum) = (0usize, 0usize, 0.0f64);
    while i < x.len() && j < y.len() {
        match x[i].index.cmp(&y[j].index) {
            std::cmp::Ordering::Equal => {
                sum += x[i].value * y[j].value;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Less => i += 1,
        }
    }
    sum
}

fn powi(base: f64, times: i32) -> f64 {
    let mut tmp = base;
    let mut ret = 1.0;
    let mut t = times;
    while t > 0 {
        if t % 2 == 1 {
            ret *= tmp;
        }
        tmp *= tmp;
        t /= 2;
    }
    ret
}

fn kernel(x: &[SvmNode], y: &[SvmNode], param: &SvmParameter) -> f64 {
    match param.kernel_type {
        KERNEL_LINEAR => dot(x, y),
        KERNEL_POLY => powi(param.gamma * dot(x, y) + param.coef0, param.degree),
        KERNEL_RBF => {
            let mut sum = 0.0;
            let (mut i, mut j) = (0usize, 0usize);
            while i < x.len() && j < y.len() {
                match x[i].index.cmp(&y[j].index) {
                    std::cmp::Ordering::Equal => {
                        let d = x[i].value - y[j].value;
                        sum += d * d;
                        i += 1;
                        j += 1;
                    }
                    std::cmp::Ordering::Greater => {
                        sum += y[j].value * y[j].value;
                        j += 1;
                    }
                    std::cmp::Ordering::Less => {
                        sum += x[i].value * x[i].value;
                        i += 1;
                    }
                }
            }
            while i < x.len() {
                sum += x[i].value * x[i].value;
                i += 1;
            }
            while j < y.len() {
                sum += y[j].value * y[j].value;
                j += 1;
            }
            (-param.gamma * sum).exp()
        }
        KERNEL_SIGMOID => (param.gamma * dot(x, y) + param.coef0).tanh(),
        KERNEL_PRECOMPUTED => x[y[0].value as usize].value,
        _ => 0.0,
    }
}

impl SvmModel {
    pub fn load(path: &Path) -> Result<Self, MlError> {
        crate::load_json(path)
    }

    /// One-vs-one voted class prediction.
    pub fn predict(&self, x: &[SvmNode]) -> i32 {
        if matches!(
            self.param.svm_type,
            SVM_TYPE_ONE_CLASS | SVM_TYPE_EPSILON_SVR | SVM_TYPE_NU_SVR
        ) {
            let coef = &self.sv_coef[0];
            let mut sum = 0.0;
            for i in 0..self.l {
                sum += coef[i] * kernel(x, &self.sv[i], &self.param);
            }
            sum -= self.rho[0];
            if self.param.svm_type != SVM_TYPE_ONE_CLASS {
                return sum as i32;
            }
            return if sum > 0.0 { 1 } else { -1 };
        }

        let kvalues: Vec<f64> = (0..self.l).map(|i| kernel(x, &self.sv[i], &self.param)).collect();

        let mut start = vec![0usize; self.nr_class];
        for i in 1..self.nr_class {
            start[i] = start[i - 1] + self.nsv[i - 1];
        }

        let mut vote = vec![0usize; self.nr_class];
        let mut p = 0usize;
        for i in 0..self.nr_class {
            for j in i + 1..self.nr_class {
                let mut sum = 0.0;
                let (si, sj) = (start[i], start[j]);
                let (ci, cj) = (self.nsv[i], self.nsv[j]);
                let coef1 = &self.sv_coef[j - 1];
                let coef2 = &self.sv_coef[i];
                for k in 0..ci {
                    sum += coef1[si + k] * kvalues[si + k];
                }
                for k in 0..cj {
                    sum += coef2[sj + k] * kvalues[sj + k];
                }
                sum -= self.rho[p];
                if sum > 0.0 {
                    vote[i] += 1;
                } else {
                    vote[j] += 1;
                }
                p += 1;
            }
        }

        let mut best = 0usize;
        for i in 1..self.nr_class {
            if vote[i] > vote[best] {
                best = i;
            }
        }
        self.label[best]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(index: i32, value: f64) -> SvmNode {
        SvmNode { index, value }
    }

    /// Two-class linear model separating on feature 1: positive → label 1,
    /// negative → label 2.
    fn two_class_model() -> SvmModel {
        SvmModel {
            param: SvmParameter {
                svm_type: SVM_TYPE_C_SVC,
                kernel_type: KERNEL_LINEAR,
                ..Default::default()
            },
            nr_class: 2,
            l: 2,
            sv: vec![vec![node(1, 1.0)], vec![node(1, -1.0)]],
            sv_coef: vec![vec![1.0, -1.0]],
            rho: vec![0.0],
            label: vec![1, 2],
            nsv: vec![1, 1],
        }
    }

    #[test]
    fn linear_two_class_separation() {
        let model = two_class_model();
        assert_eq!(model.predict(&[node(1, 2.0)]), 1);
        assert_eq!(model.predict(&[node(1, -2.0)]), 2);
    }

    #[test]
    fn rbf_kernel_is_distance_based() {
        let param = SvmParameter {
            kernel_type: KERNEL_RBF,
            gamma: 1.0,
            ..Default::default()
        };
        let same = kernel(&[node(1, 1.0)], &[node(1, 1.0)], &param);
        let far = kernel(&[node(1, 1.0)], &[node(1, 3.0)], &param);
        assert!((same - 1.0).abs() < 1e-12);
        assert!(far < same);
    }

    #[test]
    fn model_json_round_trip() {
        let json = r#"{
            "param": {"svm_type": 0, "kernel_type": 0, "degree": 0, "gamma": 0.0, "coef_0": 0.0},
            "nr_class": 2, "l": 2,
            "sv": [[{"index": 1, "value": 1.0}], [{"index": 1, "value": -1.0}]],
            "sv_coef": [[1.0, -1.0]],
            "rho": [0.0],
            "prob_a": null, "prob_b": null,
            "label": [1, 2],
            "nsv": [1, 1]
        }"#;
        let model: SvmModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.predict(&[node(1, 5.0)]), 1);
    }
}
