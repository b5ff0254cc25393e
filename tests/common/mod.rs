//! Shared fixtures for the integration tests: tiny hand-built models and
//! dictionaries that make the pipeline deterministic without shipping real
//! trained artifacts.

// Each test binary uses its own subset of these fixtures.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use annot::intern;
use lookup::{build_rare_word_map, ConceptFactory, Consumer, Dictionary, LookupParams, RareWordTerm};
use ml::linear::CacheNode;
use ml::svm::{SvmModel, SvmNode, SvmParameter, KERNEL_LINEAR, SVM_TYPE_C_SVC};
use ml::LinearModel;
use clinotate::pipeline::LookupBundle;

fn insert(root: &mut HashMap<String, CacheNode>, parts: &[&str], value: i64) {
    let node = root.entry(parts[0].to_string()).or_insert_with(|| CacheNode {
        value: -1,
        inner: HashMap::new(),
    });
    if parts.len() == 1 {
        node.value = value;
    } else {
        insert(&mut node.inner, &parts[1..], value);
    }
}

/// Sentence model: open on the first character after outside, close on
/// whitespace following a period.
pub fn sentence_detector() -> sentence::SentenceDetector {
    let mut cache = HashMap::new();
    insert(&mut cache, &["Character", "Space", "true"], 2);
    insert(&mut cache, &["CharOffset", "-1", "Id", "."], 3);
    insert(&mut cache, &["PrevOutcome", "O"], 4);

    let model = LinearModel {
        bias: -1.0,
        w: vec![
            0.0, 1.0, 0.0, // always-on: weak inside
            0.0, 0.0, 0.5, // space: weak outside
            0.0, 0.0, 2.0, // previous char '.': strong outside
            5.0, 0.0, 0.0, // previous outcome O: strong begin
        ],
        labels: vec![1, 2, 3],
        features_len: 4,
        features_cache: cache,
    };
    sentence::SentenceDetector::from_parts(model, HashMap::new())
}

/// Tagger with a single outcome: everything is NN.
pub fn nn_tagger() -> pos::Tagger {
    let model = pos::PosModel {
        probs: vec![0.0],
        outcomes: vec!["NN".to_string()],
        predicate_map: HashMap::new(),
        eval_params: pos::EvalParameters {
            params: Vec::new(),
            num_of_outcomes: 1,
        },
    };
    pos::Tagger::new(model)
}

/// Lemmatizer with empty tables: lemma = normalized form.
pub fn plain_lemmatizer() -> lemma::Lemmatizer {
    lemma::Lemmatizer::from_rules(lemma::MorphologicalRules::default())
}

fn term(tokens: &[&str], cui: &str) -> RareWordTerm {
    RareWordTerm {
        tokens: tokens.iter().map(|t| intern(t)).collect(),
        text_length: tokens.join(" ").len() as u32,
        cui: intern(cui),
        rare_word_index: 0,
    }
}

/// Concept rows covering the fixture CUIs.
pub const CONCEPT_ROWS: &str = "\
C0004057|T121|RXNORM|1191|aspirin|IN
C0032285|T047|SNOMEDCT|233604007|pneumonia|PT
C0037473|T059|LNC|2951-2|sodium measurement|CN
C0242379|T191|SNOMEDCT|93880001|malignant neoplasm of lung|PT
C0006826|T191|SNOMEDCT|363346000|cancer|PT
";

pub fn concept_scheme() -> Vec<String> {
    ["CUI", "TUI", "SAB", "CODE", "PREF", "TTY"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn write_concepts(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("concepts.bsv");
    std::fs::write(&path, CONCEPT_ROWS).expect("write concepts");
    path
}

/// Bundle with the clinical fixture dictionary.
pub fn clinical_bundle(name: &str, concepts: &Path, precision_mode: bool) -> Arc<LookupBundle> {
    let dictionary = Dictionary::from_map(build_rare_word_map(vec![
        term(&["aspirin"], "C0004057"),
        term(&["pneumonia"], "C0032285"),
        term(&["sodium"], "C0037473"),
        term(&["lung", "cancer"], "C0242379"),
        term(&["lung", "disease"], "C0024115"),
        term(&["lung", "abscess"], "C0024110"),
        term(&["cancer"], "C0006826"),
    ]));
    let factory =
        ConceptFactory::load(name, concepts, &concept_scheme(), &[]).expect("concept factory");

    Arc::new(LookupBundle {
        name: name.to_string(),
        dictionary,
        factory,
        consumer: Consumer::new(precision_mode),
        params: LookupParams::default(),
    })
}

/// Drug FSM parameters covering the fixture vocabulary.
pub fn drug_params() -> drugner::DrugFsmParams {
    let mut params = drugner::DrugFsmParams::default();
    params.strength_unit.full_text_set = drugner::word_set(&["mg", "ml"]);
    params.route.single_oral_word_set = drugner::word_set(&["po", "orally"]);
    params.frequency_unit.daily_word_set = drugner::word_set(&["daily"]);
    params.frequency_unit.prn_word_set = drugner::word_set(&["prn"]);
    params.form.full_text_set = drugner::word_set(&["tablet", "capsule"]);
    params.time.day_night_set = drugner::word_set(&["pm", "am"]);
    params
}

/// CRF that links every closest (mention, value) pair.
pub fn lab_extractor() -> lab::LabValuesExtractor {
    let crf = ml::Crf {
        features: [("LV_IS_CLOSEST".to_string(), 0usize)].into_iter().collect(),
        states: vec!["OTHER".to_string(), "LINKED".to_string()],
        initial_weights: vec![0.0, 0.0],
        final_weights: vec![0.0, 0.0],
        transitions: vec![
            vec![
                ml::crf::TransitionData { weights: vec![-2.0], default_weight: 1.0 },
                ml::crf::TransitionData { weights: vec![4.0], default_weight: -1.0 },
            ],
            vec![
                ml::crf::TransitionData { weights: vec![-2.0], default_weight: 1.0 },
                ml::crf::TransitionData { weights: vec![4.0], default_weight: -1.0 },
            ],
        ],
    };
    lab::LabValuesExtractor::from_parts(
        crf,
        lab::LabUnits::from_units(["mmol/l", "mg/dl"]),
        15,
        vec!["normal".to_string()],
    )
}

fn pcs_model() -> SvmModel {
    fn node(index: i32, value: f64) -> SvmNode {
        SvmNode { index, value }
    }
    // "smokes" → current (1), "quit" → past (2), neither → smoker (3).
    SvmModel {
        param: SvmParameter {
            svm_type: SVM_TYPE_C_SVC,
            kernel_type: KERNEL_LINEAR,
            ..Default::default()
        },
        nr_class: 3,
        l: 3,
        sv: vec![
            vec![node(2, 1.0)],
            vec![node(1, 1.0)],
            vec![node(1, -1.0), node(2, -1.0)],
        ],
        sv_coef: vec![vec![2.0, -2.0, 0.0], vec![2.0, 0.0, -2.0]],
        rho: vec![0.0, 0.0, 0.0],
        label: vec![1, 2, 3],
        nsv: vec![1, 1, 1],
    }
}

pub fn smoking_annotator() -> smoking::SmokingStatusAnnotator {
    let params = smoking::SmokingParams {
        smoking_words: ["smoking", "smoker", "smokes", "non-smoker", "tobacco"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        unknown_words: Vec::new(),
        stop_words: HashSet::new(),
        go_words: vec!["quit".to_string(), "smokes".to_string()],
        model: pcs_model(),
        smoker_phrases: vec!["smoker".to_string()],
        non_smoker_phrases: vec!["non-smoker".to_string()],
        negation_contradiction_words: HashSet::new(),
        boundaries: polarity::default_boundaries(),
    };
    smoking::SmokingStatusAnnotator::new(params)
}

pub fn clinical_configuration(name: &str, features: &[&str]) -> clinotate::Configuration {
    clinotate::Configuration {
        name: name.to_string(),
        file_path: std::path::PathBuf::new(),
        request_params: Default::default(),
        params: Default::default(),
        pipeline: "default_clinical".to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

pub fn smoking_configuration(name: &str) -> clinotate::Configuration {
    clinotate::Configuration {
        name: name.to_string(),
        file_path: std::path::PathBuf::new(),
        request_params: Default::default(),
        params: Default::default(),
        pipeline: "smoking_status".to_string(),
        features: Vec::new(),
    }
}
