//! End-to-end runs of the default-clinical branch over hand-built models.

mod common;

use std::collections::HashMap;

use clinotate::{Pipeline, Request};

fn clinical_pipeline(precision_mode: bool, dir: &std::path::Path) -> Pipeline {
    let concepts = common::write_concepts(dir);
    let bundle = common::clinical_bundle("default", &concepts, precision_mode);

    let mut lookups = HashMap::new();
    lookups.insert("default".to_string(), bundle);

    Pipeline::from_parts(
        vec![common::clinical_configuration(
            "default",
            &["lab", "drug", "polarity"],
        )],
        common::sentence_detector(),
        common::nn_tagger(),
        common::plain_lemmatizer(),
        lookups,
        None,
        Some(std::sync::Arc::new(drugner::DrugAttributesExtractor::new(
            10,
            &common::drug_params(),
        ))),
        None,
    )
}

async fn run(pipeline: &Pipeline, tid: &str, text: &str) -> serde_json::Value {
    let request = Request {
        tid: tid.to_string(),
        text: text.to_string(),
    };
    let raw = pipeline.process(&request).await.expect("process");
    serde_json::from_str(&raw).expect("valid json")
}

#[tokio::test(flavor = "multi_thread")]
async fn drug_and_negated_finding_annotations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = clinical_pipeline(true, dir.path());
    let text = "pt takes aspirin 81 mg po daily. no evidence of pneumonia.";

    let response = run(&pipeline, "tid-1", text).await;
    let payload = &response["default"];
    assert_eq!(payload["docId"], "tid-1");

    let content = payload["content"].as_array().expect("content");
    assert_eq!(content.len(), 2, "aspirin and pneumonia: {content:?}");

    // Sorted by begin: aspirin first.
    let aspirin = &content[0];
    assert_eq!(aspirin["text"], serde_json::json!(["aspirin", 9, 16]));
    assert_eq!(aspirin["aspect"], "drug");
    assert_eq!(aspirin["name"], "MedicationMention");
    assert_eq!(aspirin["sectionOid"], "SIMPLE_SEGMENT");
    assert_eq!(aspirin["umlsConcepts"][0]["cui"], "C0004057");
    assert_eq!(aspirin["umlsConcepts"][0]["tui"], serde_json::json!(["T121"]));

    let attributes = &aspirin["attributes"];
    assert_eq!(attributes["medStrengthNum"], serde_json::json!(["81", 17, 19]));
    assert_eq!(attributes["medStrengthUnit"], serde_json::json!(["mg", 20, 22]));
    assert_eq!(attributes["medRoute"], "Enteral_Oral");
    assert_eq!(attributes["medFrequencyUnit"], serde_json::json!(["daily", 26, 31]));
    assert_eq!(attributes["medFrequencyNumber"], serde_json::json!(["1.0", 26, 31]));
    assert_eq!(attributes["medDosage"], serde_json::Value::Null);
    assert_eq!(attributes["polarity"], "positive");

    let pneumonia = &content[1];
    assert_eq!(pneumonia["aspect"], "prob");
    assert_eq!(pneumonia["name"], "DiseaseDisorderMention");
    assert_eq!(pneumonia["attributes"]["polarity"], "negative");
    assert_eq!(pneumonia["umlsConcepts"][0]["cui"], "C0032285");
    assert_eq!(
        pneumonia["umlsConcepts"][0]["sabConcepts"][0]["codingScheme"],
        "SNOMEDCT"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn annotation_spans_slice_the_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = clinical_pipeline(true, dir.path());
    let text = "pt takes aspirin 81 mg po daily. no evidence of pneumonia.";

    let response = run(&pipeline, "tid-2", text).await;
    let runes: Vec<char> = text.chars().collect();

    for section in response["default"]["content"].as_array().expect("content") {
        let triple = section["text"].as_array().expect("triple");
        let begin = triple[1].as_i64().expect("begin") as usize;
        let end = triple[2].as_i64().expect("end") as usize;
        assert!(begin < end);
        let slice: String = runes[begin..end].iter().collect();
        assert_eq!(
            triple[0].as_str().expect("text"),
            slice.to_lowercase(),
            "span text must match the rune slice"
        );

        let sentence = section["sentence"].as_array().expect("sentence");
        let s_begin = sentence[0].as_i64().unwrap() as usize;
        let s_end = sentence[1].as_i64().unwrap() as usize;
        assert!(s_begin <= begin && end <= s_end);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn processing_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = clinical_pipeline(true, dir.path());
    let request = Request {
        tid: "tid-3".to_string(),
        text: "pt takes aspirin 81 mg po daily. no evidence of pneumonia.".to_string(),
    };

    let first = pipeline.process(&request).await.expect("first run");
    let second = pipeline.process(&request).await.expect("second run");
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn precision_mode_drops_contained_spans() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = "history of lung cancer noted.";

    let with = clinical_pipeline(true, dir.path());
    let response = run(&with, "tid-4", text).await;
    let content = response["default"]["content"].as_array().expect("content");
    assert_eq!(content.len(), 1, "precision mode keeps the longer span");
    assert_eq!(content[0]["text"][0], "lung cancer");

    let without = clinical_pipeline(false, dir.path());
    let response = run(&without, "tid-5", text).await;
    let content = response["default"]["content"].as_array().expect("content");
    assert_eq!(content.len(), 2, "both spans without precision mode");
}

#[tokio::test(flavor = "multi_thread")]
async fn lab_values_link_through_the_branch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let concepts = common::write_concepts(dir.path());
    let bundle = common::clinical_bundle("default", &concepts, true);
    let mut lookups = HashMap::new();
    lookups.insert("default".to_string(), bundle);

    let pipeline = Pipeline::from_parts(
        vec![common::clinical_configuration("default", &["lab"])],
        common::sentence_detector(),
        common::nn_tagger(),
        common::plain_lemmatizer(),
        lookups,
        Some(std::sync::Arc::new(common::lab_extractor())),
        None,
        None,
    );

    let response = run(&pipeline, "tid-lab", "sodium was 138 mmol/L.").await;
    let content = response["default"]["content"].as_array().expect("content");
    assert_eq!(content.len(), 1);
    let sodium = &content[0];
    assert_eq!(sodium["aspect"], "lab");
    assert_eq!(sodium["name"], "LabMention");
    assert_eq!(
        sodium["attributes"]["labValue"],
        serde_json::json!(["138", 11, 14])
    );
    assert_eq!(
        sodium["attributes"]["labValueUnit"],
        serde_json::json!(["mmol/l", 15, 21])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_text_yields_empty_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = clinical_pipeline(true, dir.path());
    let response = run(&pipeline, "tid-6", "").await;
    assert_eq!(
        response["default"]["content"],
        serde_json::Value::Array(Vec::new())
    );
}
