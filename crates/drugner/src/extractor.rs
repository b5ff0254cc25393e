//! The drug attribute extractor: runs the FSM battery per sentence and
//! writes the `med*` attribute contract on each drug mention.

use std::collections::HashMap;
use std::sync::Arc;

use annot::{Annotation, AttrValue, Semantic, Sentence};
use tracing::debug;

use crate::machines::{first_in_span, FsmBattery, FsmResults};
use crate::params::DrugFsmParams;
use crate::tokens::{DrugOut, FrequencyQuantity, OutKind};
use crate::DrugNerError;

pub const PARAM_MED_FREQUENCY_NUMBER: &str = "medFrequencyNumber";
pub const PARAM_MED_FREQUENCY_UNIT: &str = "medFrequencyUnit";
pub const PARAM_MED_STRENGTH_NUM: &str = "medStrengthNum";
pub const PARAM_MED_STRENGTH_UNIT: &str = "medStrengthUnit";
pub const PARAM_MED_STATUS_CHANGE: &str = "medStatusChange";
pub const PARAM_MED_DOSAGE: &str = "medDosage";
pub const PARAM_MED_ROUTE: &str = "medRoute";
pub const PARAM_MED_FORM: &str = "medForm";
pub const PARAM_MED_DURATION: &str = "medDuration";

/// Every key the extractor writes on a drug mention. Downstream consumers
/// rely on all nine being present.
pub const MED_ATTRIBUTE_KEYS: [&str; 9] = [
    PARAM_MED_FREQUENCY_NUMBER,
    PARAM_MED_FREQUENCY_UNIT,
    PARAM_MED_STRENGTH_NUM,
    PARAM_MED_STRENGTH_UNIT,
    PARAM_MED_STATUS_CHANGE,
    PARAM_MED_DOSAGE,
    PARAM_MED_ROUTE,
    PARAM_MED_FORM,
    PARAM_MED_DURATION,
];

const DEFAULT_MAX_ATTRIBUTE_DISTANCE: usize = 10;

pub struct DrugAttributesExtractor {
    battery: FsmBattery,
    max_attribute_distance: usize,
}

fn triple(out: &DrugOut) -> AttrValue {
    AttrValue::Triple(out.span.text.to_string(), out.span.begin, out.span.end)
}

impl DrugAttributesExtractor {
    pub fn new(max_attribute_distance: usize, params: &DrugFsmParams) -> Self {
        DrugAttributesExtractor {
            battery: FsmBattery::new(params),
            max_attribute_distance: if max_attribute_distance > 0 {
                max_attribute_distance
            } else {
                DEFAULT_MAX_ATTRIBUTE_DISTANCE
            },
        }
    }

    /// Write drug attributes on every drug mention, sentence by sentence.
    pub fn extract(&self, annotations: &mut [Annotation]) -> Result<(), DrugNerError> {
        let mut by_sentence: HashMap<*const Sentence, Vec<usize>> = HashMap::new();
        for (idx, annotation) in annotations.iter().enumerate() {
            if annotation.semantic != Semantic::Drug {
                continue;
            }
            by_sentence
                .entry(Arc::as_ptr(&annotation.sentence))
                .or_default()
                .push(idx);
        }

        for indices in by_sentence.values() {
            if indices.is_empty() {
                continue;
            }
            let sentence = Arc::clone(&annotations[indices[0]].sentence);
            if sentence.tokens.is_empty() {
                return Err(DrugNerError::EmptySentence);
            }
            let results = self.battery.execute(&sentence)?;
            let windows = self.window_spans(&sentence, annotations, indices);
            debug!(
                sentence_begin = sentence.span.begin,
                drugs = indices.len(),
                "drug attribute windows computed"
            );

            for (slot, idx) in indices.iter().enumerate() {
                let (begin, end) = windows[slot];
                write_attributes(&mut annotations[*idx], &results, begin, end);
            }
        }
        Ok(())
    }

    /// Attribute window per drug: from the drug's end to the next drug, the
    /// sentence end or a fixed token distance, whichever comes first.
    fn window_spans(
        &self,
        sentence: &Sentence,
        annotations: &[Annotation],
        indices: &[usize],
    ) -> Vec<(i32, i32)> {
        let tokens = &sentence.tokens;
        let mut windows = Vec::with_capacity(indices.len());

        for (slot, idx) in indices.iter().enumerate() {
            let drug = &annotations[*idx];
            let mut window_end = sentence.span.end;
            if slot < indices.len() - 1 {
                window_end = annotations[indices[slot + 1]].span.begin;
            }

            let mut start_token = 0usize;
            while start_token < tokens.len() && tokens[start_token].span.begin < drug.span.end {
                start_token += 1;
            }

            let mut total = start_token;
            while total < tokens.len()
                && tokens[total].span.end <= window_end
                && total <= start_token + self.max_attribute_distance
            {
                total += 1;
            }

            if total > 0 {
                window_end = tokens[total - 1].span.end;
            }
            windows.push((drug.span.end, window_end));
        }
        windows
    }
}

fn write_attributes(drug: &mut Annotation, results: &FsmResults, begin: i32, end: i32) {
    let frequency_unit = first_in_span(&results.frequency_units, begin, end);
    match frequency_unit {
        Some(out) => {
            drug.attributes
                .insert(PARAM_MED_FREQUENCY_UNIT.to_string(), triple(out));
        }
        None => {
            drug.attributes
                .insert(PARAM_MED_FREQUENCY_UNIT.to_string(), AttrValue::EmptyList);
        }
    }

    match first_in_span(&results.frequencies, begin, end) {
        Some(out) => {
            let text = match &out.kind {
                OutKind::Frequency(value) if !value.is_empty() => value.clone(),
                _ => out.span.text.to_string(),
            };
            drug.attributes.insert(
                PARAM_MED_FREQUENCY_NUMBER.to_string(),
                AttrValue::Triple(text, out.span.begin, out.span.end),
            );
        }
        None => {
            let fallback = frequency_unit.and_then(|out| match &out.kind {
                OutKind::FrequencyUnit(quantity) if *quantity != FrequencyQuantity::Prn => {
                    Some(AttrValue::Triple(
                        quantity.value().to_string(),
                        out.span.begin,
                        out.span.end,
                    ))
                }
                _ => None,
            });
            drug.attributes.insert(
                PARAM_MED_FREQUENCY_NUMBER.to_string(),
                fallback.unwrap_or(AttrValue::EmptyList),
            );
        }
    }

    let as_triple_or_empty = |outs: &[DrugOut]| match first_in_span(outs, begin, end) {
        Some(out) => triple(out),
        None => AttrValue::EmptyList,
    };
    drug.attributes.insert(
        PARAM_MED_STRENGTH_NUM.to_string(),
        as_triple_or_empty(&results.strengths),
    );
    drug.attributes.insert(
        PARAM_MED_STRENGTH_UNIT.to_string(),
        as_triple_or_empty(&results.strength_units),
    );

    let status = first_in_span(&results.statuses, begin, end).and_then(|out| match &out.kind {
        OutKind::ChangeStatus(status) => Some(AttrValue::Text(status.label().to_string())),
        _ => None,
    });
    drug.attributes.insert(
        PARAM_MED_STATUS_CHANGE.to_string(),
        status.unwrap_or(AttrValue::Null),
    );

    let as_text_or_null = |outs: &[DrugOut]| match first_in_span(outs, begin, end) {
        Some(out) => AttrValue::Text(out.span.text.to_string()),
        None => AttrValue::Null,
    };
    drug.attributes
        .insert(PARAM_MED_DOSAGE.to_string(), as_text_or_null(&results.dosages));

    let route = first_in_span(&results.routes, begin, end).and_then(|out| match &out.kind {
        OutKind::Route(method) => Some(AttrValue::Text(method.label().to_string())),
        _ => None,
    });
    drug.attributes
        .insert(PARAM_MED_ROUTE.to_string(), route.unwrap_or(AttrValue::Null));

    drug.attributes
        .insert(PARAM_MED_FORM.to_string(), as_text_or_null(&results.forms));
    drug.attributes.insert(
        PARAM_MED_DURATION.to_string(),
        as_text_or_null(&results.durations),
    );
}
