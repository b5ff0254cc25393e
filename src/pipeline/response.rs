//! Response assembly: the per-configuration JSON payloads.
//!
//! Casing rules on emit: TUIs, CUIs, SABs and TTYs upper-case; mention and
//! sentence text lower-case.

use annot::{Annotation, Attributes, Concept, Sentence};
use serde::Serialize;

/// `[text, begin, end]` triple.
#[derive(Debug, Serialize)]
pub struct TextTriple(pub String, pub i32, pub i32);

#[derive(Debug, Serialize)]
pub struct VocabConcept {
    pub tty: Vec<String>,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SabConcept {
    #[serde(rename = "codingScheme")]
    pub coding_scheme: String,
    #[serde(rename = "vocabConcepts")]
    pub vocab_concepts: Vec<VocabConcept>,
}

#[derive(Debug, Serialize)]
pub struct UmlsConcept {
    pub tui: Vec<String>,
    pub cui: String,
    #[serde(rename = "preferredText")]
    pub preferred_text: String,
    #[serde(rename = "sabConcepts")]
    pub sab_concepts: Vec<SabConcept>,
}

#[derive(Debug, Serialize)]
pub struct ContentSection {
    pub id: usize,
    pub sentence: [i32; 2],
    #[serde(rename = "sectionOffset")]
    pub section_offset: [i32; 2],
    pub text: TextTriple,
    #[serde(rename = "sectionOid")]
    pub section_oid: String,
    pub attributes: Attributes,
    pub aspect: String,
    pub name: String,
    #[serde(rename = "umlsConcepts")]
    pub umls_concepts: Vec<UmlsConcept>,
}

#[derive(Debug, Serialize)]
pub struct DefaultClinicalResponse {
    #[serde(rename = "docId")]
    pub doc_id: String,
    pub dob: String,
    pub gender: String,
    pub age: String,
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Serialize)]
pub struct SmokingStatusSection {
    pub status: String,
    pub text: TextTriple,
}

#[derive(Debug, Serialize)]
pub struct SmokingStatusResponse {
    #[serde(rename = "docId")]
    pub doc_id: String,
    pub dob: String,
    pub gender: String,
    pub age: String,
    #[serde(rename = "smokingStatus")]
    pub smoking_status: String,
    pub sentences: Vec<SmokingStatusSection>,
}

fn umls_concept(concept: &Concept) -> UmlsConcept {
    let mut sab_concepts = Vec::with_capacity(concept.codes.len());
    for (coding_scheme, codes) in &concept.codes {
        let mut vocab_concepts = Vec::with_capacity(codes.len());
        for (code, params) in codes {
            let tty = params
                .get(annot::scheme::TTY)
                .map(|values| values.iter().map(|value| value.to_uppercase()).collect())
                .unwrap_or_default();
            vocab_concepts.push(VocabConcept {
                tty,
                code: code.clone(),
            });
        }
        sab_concepts.push(SabConcept {
            coding_scheme: coding_scheme.to_uppercase(),
            vocab_concepts,
        });
    }

    UmlsConcept {
        tui: concept.tuis.iter().map(|tui| tui.to_uppercase()).collect(),
        cui: concept.cui.to_uppercase(),
        preferred_text: concept.preferred_text.clone(),
        sab_concepts,
    }
}

/// Build the default-clinical payload from begin-sorted annotations.
pub fn default_clinical_response(
    tid: &str,
    text: &str,
    annotations: &[Annotation],
) -> DefaultClinicalResponse {
    let offset_end = text.chars().count() as i32;
    let content = annotations
        .iter()
        .enumerate()
        .map(|(id, annotation)| ContentSection {
            id,
            sentence: [annotation.sentence.span.begin, annotation.sentence.span.end],
            section_offset: [0, offset_end],
            text: TextTriple(
                annotation.span.text.to_lowercase(),
                annotation.span.begin,
                annotation.span.end,
            ),
            section_oid: "SIMPLE_SEGMENT".to_string(),
            attributes: annotation.attributes.clone(),
            aspect: annotation.semantic.aspect().to_string(),
            name: annotation.name().to_string(),
            umls_concepts: annotation.concepts.iter().map(|c| umls_concept(c)).collect(),
        })
        .collect();

    DefaultClinicalResponse {
        doc_id: tid.to_string(),
        dob: String::new(),
        gender: String::new(),
        age: String::new(),
        content,
    }
}

/// Build the smoking-status payload from classified sentences.
pub fn smoking_status_response(
    tid: &str,
    document_status: &str,
    sentences: &[Sentence],
) -> SmokingStatusResponse {
    SmokingStatusResponse {
        doc_id: tid.to_string(),
        dob: String::new(),
        gender: String::new(),
        age: String::new(),
        smoking_status: document_status.to_string(),
        sentences: sentences
            .iter()
            .map(|sentence| SmokingStatusSection {
                status: sentence.attributes.smoking_status.clone(),
                text: TextTriple(
                    sentence.span.text.to_lowercase(),
                    sentence.span.begin,
                    sentence.span.end,
                ),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::{intern, istr, Semantic, Span};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn annotation() -> Annotation {
        let mut sent = Sentence::new(Span::new(0, 25, istr("No evidence of Pneumonia.")));
        sent.tokens = Vec::new();
        let sent = Arc::new(sent);

        let mut codes: BTreeMap<String, annot::ConceptCodes> = BTreeMap::new();
        let mut params = BTreeMap::new();
        params.insert("TTY".to_string(), vec!["pt".to_string()]);
        let mut code_map = annot::ConceptCodes::new();
        code_map.insert("233604007".to_string(), params);
        codes.insert("snomedct".to_string(), code_map);

        let concept = Concept {
            cui: intern("c0032285"),
            preferred_text: "pneumonia".to_string(),
            tuis: vec!["t047".to_string()],
            codes,
        };

        let mut annotation = Annotation::new(
            Span::new(15, 24, istr("Pneumonia")),
            Semantic::Disorder,
            sent,
        );
        annotation.concepts.push(Arc::new(concept));
        annotation.attributes.insert(
            "polarity".to_string(),
            annot::AttrValue::Text("negative".into()),
        );
        annotation
    }

    #[test]
    fn casing_rules_apply_on_emit() {
        let response =
            default_clinical_response("tid-1", "No evidence of Pneumonia.", &[annotation()]);
        let section = &response.content[0];
        assert_eq!(section.text.0, "pneumonia");
        let concept = &section.umls_concepts[0];
        assert_eq!(concept.cui, "C0032285");
        assert_eq!(concept.tui, vec!["T047"]);
        assert_eq!(concept.sab_concepts[0].coding_scheme, "SNOMEDCT");
        assert_eq!(concept.sab_concepts[0].vocab_concepts[0].tty, vec!["PT"]);
        assert_eq!(concept.sab_concepts[0].vocab_concepts[0].code, "233604007");
        assert_eq!(concept.preferred_text, "pneumonia");
    }

    #[test]
    fn section_shape_matches_the_contract() {
        let response =
            default_clinical_response("tid-1", "No evidence of Pneumonia.", &[annotation()]);
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["docId"], "tid-1");
        assert_eq!(value["dob"], "");
        let section = &value["content"][0];
        assert_eq!(section["id"], 0);
        assert_eq!(section["sentence"], serde_json::json!([0, 25]));
        assert_eq!(section["sectionOffset"], serde_json::json!([0, 25]));
        assert_eq!(section["text"], serde_json::json!(["pneumonia", 15, 24]));
        assert_eq!(section["sectionOid"], "SIMPLE_SEGMENT");
        assert_eq!(section["aspect"], "prob");
        assert_eq!(section["name"], "DiseaseDisorderMention");
        assert_eq!(section["attributes"]["polarity"], "negative");
    }

    #[test]
    fn smoking_shape_matches_the_contract() {
        let mut sent = Sentence::new(Span::new(0, 28, istr("Patient quit smoking in 1998")));
        sent.attributes.smoking_status = "PAST_SMOKER".to_string();

        let response = smoking_status_response("tid-2", "PAST_SMOKER", &[sent]);
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["smokingStatus"], "PAST_SMOKER");
        assert_eq!(value["sentences"][0]["status"], "PAST_SMOKER");
        assert_eq!(
            value["sentences"][0]["text"],
            serde_json::json!(["patient quit smoking in 1998", 0, 28])
        );
    }
}
