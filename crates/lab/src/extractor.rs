//! The lab value relation extractor.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use annot::{intern, Annotation, AttrValue, Semantic, Sentence, Span, Token};
use ml::{Crf, Feature};
use tracing::debug;

use crate::machines::{date_tokens, fraction_tokens, range_tokens};
use crate::units::LabUnits;
use crate::LabError;

pub const ATTR_LAB_VALUE: &str = "labValue";
pub const ATTR_LAB_VALUE_UNIT: &str = "labValueUnit";

const MAX_WINDOW_SIZE: usize = 50;
const LOOKUP_KEY_ANNOTATIONS_COUNT: usize = 5;
const CONJUNCTION_POS: &str = "CC";

const LV_DISTANCE: &str = "LV_DISTANCE";
const LV_TERMS_BETWEEN: &str = "LV_TERMS_BETWEEN";
const LV_VALUES_BETWEEN: &str = "LV_VALUES_BETWEEN";
const LV_IS_CLOSEST: &str = "LV_IS_CLOSEST";
const LV_POINT: &str = "LV_POINT";
const LV_NEW_LINE: &str = "LV_NEW_LINE";
const LV_PUNCTUATION: &str = "LV_PUNCTUATION";
const LV_CONJ: &str = "LV_CONJ";

const LINKED_CATEGORY: &str = "LINKED";

/// One element of the merged lab sequence.
enum LabItem {
    /// A lab mention; index into the caller's annotation slice.
    Mention { ann: usize, span: Span },
    /// A configured value word (`normal`, …).
    SpecialValue { span: Span },
    /// A sentence token (number tokens double as candidate values).
    Token(Token),
}

impl LabItem {
    fn span(&self) -> &Span {
        match self {
            LabItem::Mention { span, .. } => span,
            LabItem::SpecialValue { span } => span,
            LabItem::Token(token) => &token.span,
        }
    }
}

pub struct LabValuesExtractor {
    classifier: Crf,
    units: LabUnits,
    max_token_distance: usize,
    string_values: Vec<String>,
}

impl LabValuesExtractor {
    pub fn load(
        model_path: &Path,
        units_path: &Path,
        max_token_distance: usize,
        string_values: Vec<String>,
    ) -> Result<Self, LabError> {
        Ok(LabValuesExtractor {
            classifier: Crf::load(model_path)?,
            units: LabUnits::load(units_path)?,
            max_token_distance,
            string_values,
        })
    }

    pub fn from_parts(
        classifier: Crf,
        units: LabUnits,
        max_token_distance: usize,
        string_values: Vec<String>,
    ) -> Self {
        LabValuesExtractor {
            classifier,
            units,
            max_token_distance,
            string_values,
        }
    }

    /// Write `labValue` / `labValueUnit` attributes on the lab mentions.
    pub fn extract(&self, annotations: &mut [Annotation]) -> Result<(), LabError> {
        let mut by_sentence: HashMap<*const Sentence, Vec<usize>> = HashMap::new();
        for (idx, annotation) in annotations.iter().enumerate() {
            by_sentence
                .entry(Arc::as_ptr(&annotation.sentence))
                .or_default()
                .push(idx);
        }

        for indices in by_sentence.values() {
            self.extract_sentence(annotations, indices)?;
        }
        Ok(())
    }

    fn extract_sentence(
        &self,
        annotations: &mut [Annotation],
        indices: &[usize],
    ) -> Result<(), LabError> {
        let Some(first) = indices.first() else {
            return Ok(());
        };
        let sentence = Arc::clone(&annotations[*first].sentence);
        if sentence.tokens.is_empty() {
            let span = &annotations[*first].span;
            return Err(LabError::EmptySentence {
                text: span.text.to_string(),
                begin: span.begin,
                end: span.end,
            });
        }

        let tokens = self.units.split(sentence.tokens.clone());

        // Stable begin order for both mentions and tokens.
        let mut sorted_indices: Vec<usize> = indices.to_vec();
        sorted_indices.sort_by_key(|idx| annotations[*idx].span.begin);

        let special_words = self.find_special_value_words(&sentence);
        let fractions = fraction_tokens(&sentence)?;
        let ranges = range_tokens(&sentence)?;
        let dates = date_tokens(&sentence, &ranges)?;

        let (items, mention_slots, value_slots) = build_sequence(
            annotations,
            &sorted_indices,
            &tokens,
            &special_words,
            &dates,
            &ranges,
            &fractions,
        );

        if mention_slots.is_empty() || value_slots.is_empty() {
            return Ok(());
        }

        let (pairs, features) = extract_pairs_features(&mention_slots, &value_slots, &items);
        if features.is_empty() {
            return Ok(());
        }

        let categories = self.classifier.predict(&features);
        debug!(
            pairs = pairs.len(),
            linked = categories.iter().filter(|c| c.eq_ignore_ascii_case(LINKED_CATEGORY)).count(),
            "lab pairs classified"
        );

        for (pair, category) in pairs.iter().zip(categories.iter()) {
            if !category.eq_ignore_ascii_case(LINKED_CATEGORY) {
                continue;
            }
            let (mention_idx, value_idx) = *pair;
            if mention_idx.abs_diff(value_idx) >= self.max_token_distance {
                continue;
            }
            let LabItem::Mention { ann, .. } = &items[mention_idx] else {
                continue;
            };
            let value_span = items[value_idx].span().clone();
            let annotation = &mut annotations[*ann];
            annotation.attributes.insert(
                ATTR_LAB_VALUE.to_string(),
                AttrValue::Triple(value_span.text.to_string(), value_span.begin, value_span.end),
            );

            if value_idx < items.len() - 1 {
                let following: Vec<&Span> = items[value_idx + 1..].iter().map(LabItem::span).collect();
                if let Some(unit) = self.units.execute(&following) {
                    annotation.attributes.insert(
                        ATTR_LAB_VALUE_UNIT.to_string(),
                        AttrValue::Triple(unit.span.text.to_string(), unit.span.begin, unit.span.end),
                    );
                }
            }
        }
        Ok(())
    }

    /// Scan the sentence text for the configured value words, rightmost
    /// occurrences first, emitted in ascending span order.
    fn find_special_value_words(&self, sentence: &Sentence) -> Vec<Span> {
        let mut found = Vec::new();
        let mut text = sentence.span.text.to_lowercase();
        loop {
            let before = text.len();
            for word in &self.string_values {
                let Some(offset) = text.find(word.as_str()) else {
                    continue;
                };
                let length = word.chars().count() as i32;
                text.truncate(offset);
                let begin = sentence.span.begin + text.chars().count() as i32;
                found.insert(0, Span::new(begin, begin + length, intern(word)));
            }
            if text.len() == before || text.is_empty() {
                break;
            }
        }
        found
    }
}

/// Merge lab mentions, values and tokens into one ordered sequence.
/// Returns the items plus the slot indices of mentions and values.
#[allow(clippy::too_many_arguments)]
fn build_sequence(
    annotations: &[Annotation],
    sorted_indices: &[usize],
    tokens: &[Token],
    special_words: &[Span],
    dates: &[Token],
    ranges: &[Token],
    fractions: &[Token],
) -> (Vec<LabItem>, Vec<usize>, Vec<usize>) {
    let mut items: Vec<LabItem> = Vec::with_capacity(tokens.len());
    let mut mention_slots = Vec::new();
    let mut value_slots = Vec::new();

    let mut last_span_end = -1i32;
    let mut annotation_cursor = 0usize;
    let mut special_cursor = 0usize;
    let mut date_cursor = 0usize;
    let mut range_cursor = 0usize;
    let mut fraction_cursor = 0usize;

    for token in tokens {
        if token.span.begin < last_span_end {
            continue;
        }

        if annotation_cursor < sorted_indices.len() {
            let annotation = &annotations[sorted_indices[annotation_cursor]];
            if annot::spans_cover(&token.span, &annotation.span) {
                annotation_cursor += 1;
                if annotation.semantic == Semantic::Lab {
                    mention_slots.push(items.len());
                    items.push(LabItem::Mention {
                        ann: sorted_indices[annotation_cursor - 1],
                        span: annotation.span.clone(),
                    });
                    last_span_end = annotation.span.end;
                    continue;
                }
            }
        }

        if date_cursor < dates.len() && token.span.end > dates[date_cursor].span.begin {
            if annot::spans_cover(&token.span, &dates[date_cursor].span) {
                if token.span.end == dates[date_cursor].span.end {
                    date_cursor += 1;
                }
                continue;
            }
        }

        if range_cursor < ranges.len() && token.span.end > ranges[range_cursor].span.begin {
            if annot::spans_cover(&token.span, &ranges[range_cursor].span) {
                if token.span.end == ranges[range_cursor].span.end {
                    value_slots.push(items.len());
                    items.push(LabItem::Token(ranges[range_cursor].clone()));
                    range_cursor += 1;
                }
                continue;
            }
        }

        if fraction_cursor < fractions.len() && token.span.end > fractions[fraction_cursor].span.begin
        {
            if annot::spans_cover(&token.span, &fractions[fraction_cursor].span) {
                if token.span.end == fractions[fraction_cursor].span.end {
                    value_slots.push(items.len());
                    items.push(LabItem::Token(fractions[fraction_cursor].clone()));
                    fraction_cursor += 1;
                }
                continue;
            }
        }

        if token.is_number {
            value_slots.push(items.len());
            items.push(LabItem::Token(token.clone()));
            last_span_end = token.span.end;
        } else {
            while special_cursor < special_words.len()
                && special_words[special_cursor].begin <= token.span.begin
            {
                let special = &special_words[special_cursor];
                special_cursor += 1;
                if annot::spans_cover(&token.span, special) {
                    value_slots.push(items.len());
                    items.push(LabItem::SpecialValue { span: special.clone() });
                    last_span_end = special.end;
                    break;
                }
            }
        }

        if last_span_end < token.span.end {
            items.push(LabItem::Token(token.clone()));
        }
    }

    (items, mention_slots, value_slots)
}

fn extract_pairs_features(
    mention_slots: &[usize],
    value_slots: &[usize],
    items: &[LabItem],
) -> (Vec<(usize, usize)>, Vec<Vec<Feature>>) {
    let mut pairs = Vec::new();
    let mut all_features = Vec::new();

    for mention in mention_slots {
        let mut values_used = 0usize;
        let mut batch: Vec<((usize, usize), Vec<Feature>)> = Vec::with_capacity(value_slots.len());

        for value in value_slots {
            if mention.abs_diff(*value) <= MAX_WINDOW_SIZE {
                let features = extract_pair_features(*mention, *value, items);
                if features.is_empty() {
                    continue;
                }
                batch.push(((*mention, *value), features));
                values_used += 1;
            }
            if values_used > 2 * LOOKUP_KEY_ANNOTATIONS_COUNT {
                break;
            }
        }

        for (pair, features) in batch.into_iter().rev() {
            pairs.push(pair);
            all_features.push(features);
        }
    }

    (pairs, all_features)
}

fn extract_pair_features(mention: usize, value: usize, items: &[LabItem]) -> Vec<Feature> {
    let mut features = Vec::new();

    let (begin, end, order) = if value < mention {
        (value, mention, -1)
    } else {
        (mention, value, 1)
    };

    let mut distance = 0i32;
    let mut terms_between = 0i32;
    let mut values_between = 0i32;

    for item in &items[begin + 1..end] {
        distance += 1;
        match item {
            LabItem::Mention { .. } => {
                terms_between += 1;
                features.push(Feature::Str {
                    name: LV_POINT,
                    value: format!("TERM_{terms_between}"),
                });
            }
            LabItem::SpecialValue { .. } => {
                values_between += 1;
                features.push(Feature::Str {
                    name: LV_POINT,
                    value: format!("VALUE_{values_between}"),
                });
            }
            LabItem::Token(token) => {
                if token.is_number {
                    values_between += 1;
                    features.push(Feature::Str {
                        name: LV_POINT,
                        value: format!("VALUE_{values_between}"),
                    });
                }
                if token.is_newline {
                    features.push(Feature::Int {
                        name: LV_NEW_LINE,
                        value: distance,
                    });
                    continue;
                }
                if token.is_punct {
                    features.push(Feature::Str {
                        name: LV_PUNCTUATION,
                        value: token.span.text.to_string(),
                    });
                }
                let Some(tag) = &token.tag else {
                    continue;
                };
                if tag.eq_ignore_ascii_case(CONJUNCTION_POS) {
                    features.push(Feature::Str {
                        name: LV_CONJ,
                        value: token.span.text.to_uppercase(),
                    });
                }
            }
        }
    }

    features.push(Feature::Int {
        name: LV_DISTANCE,
        value: distance * order,
    });
    features.push(Feature::Int {
        name: LV_TERMS_BETWEEN,
        value: terms_between,
    });
    features.push(Feature::Int {
        name: LV_VALUES_BETWEEN,
        value: values_between,
    });
    features.push(Feature::Bool {
        name: LV_IS_CLOSEST,
        value: terms_between + values_between == 0,
    });
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::istr;
    use ml::crf::TransitionData;

    fn word(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        let mut t = Token::new(Span::new(begin, end, istr(text)));
        t.is_word = true;
        t
    }

    fn number(text: &str, begin: i32) -> Token {
        let mut t = word(text, begin);
        t.is_word = false;
        t.is_number = true;
        t
    }

    fn sentence(text: &str, tokens: Vec<Token>) -> Arc<Sentence> {
        let mut sent = Sentence::new(Span::new(0, text.chars().count() as i32, istr(text)));
        sent.tokens = tokens;
        Arc::new(sent)
    }

    /// A CRF that links every closest pair and nothing else.
    fn closest_crf() -> Crf {
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

    fn extractor() -> LabValuesExtractor {
        LabValuesExtractor::from_parts(
            closest_crf(),
            LabUnits::from_units(["mmol/l", "mg/dl"]),
            15,
            vec!["normal".to_string()],
        )
    }

    #[test]
    fn links_value_and_unit_to_the_mention() {
        // "sodium was 138 mmol/l"
        let sent = sentence(
            "sodium was 138 mmol/l",
            vec![
                word("sodium", 0),
                word("was", 7),
                number("138", 11),
                word("mmol/l", 15),
            ],
        );
        let mut annotations = vec![Annotation::new(
            Span::new(0, 6, istr("sodium")),
            Semantic::Lab,
            Arc::clone(&sent),
        )];

        extractor().extract(&mut annotations).expect("extract");

        let attrs = &annotations[0].attributes;
        assert_eq!(
            attrs[ATTR_LAB_VALUE],
            AttrValue::Triple("138".into(), 11, 14)
        );
        assert_eq!(
            attrs[ATTR_LAB_VALUE_UNIT],
            AttrValue::Triple("mmol/l".into(), 15, 21)
        );
    }

    #[test]
    fn fused_unit_tokens_are_split_before_linking() {
        let sent = sentence(
            "glucose 90mg/dl noted",
            vec![word("glucose", 0), word("90mg/dl", 8), word("noted", 16)],
        );
        let mut annotations = vec![Annotation::new(
            Span::new(0, 7, istr("glucose")),
            Semantic::Lab,
            Arc::clone(&sent),
        )];

        extractor().extract(&mut annotations).expect("extract");

        let attrs = &annotations[0].attributes;
        assert_eq!(attrs[ATTR_LAB_VALUE], AttrValue::Triple("90".into(), 8, 10));
        assert_eq!(
            attrs[ATTR_LAB_VALUE_UNIT],
            AttrValue::Triple("mg/dl".into(), 10, 15)
        );
    }

    #[test]
    fn special_value_words_can_be_values() {
        let sent = sentence(
            "sodium was normal today",
            vec![
                word("sodium", 0),
                word("was", 7),
                word("normal", 11),
                word("today", 18),
            ],
        );
        let mut annotations = vec![Annotation::new(
            Span::new(0, 6, istr("sodium")),
            Semantic::Lab,
            Arc::clone(&sent),
        )];

        extractor().extract(&mut annotations).expect("extract");

        assert_eq!(
            annotations[0].attributes[ATTR_LAB_VALUE],
            AttrValue::Triple("normal".into(), 11, 17)
        );
    }

    #[test]
    fn no_values_leaves_attributes_untouched() {
        let sent = sentence(
            "sodium pending",
            vec![word("sodium", 0), word("pending", 7)],
        );
        let mut annotations = vec![Annotation::new(
            Span::new(0, 6, istr("sodium")),
            Semantic::Lab,
            Arc::clone(&sent),
        )];
        extractor().extract(&mut annotations).expect("extract");
        assert!(annotations[0].attributes.is_empty());
    }

    #[test]
    fn dates_are_swallowed_not_linked() {
        // The only number-ish content is a date: nothing links.
        let sent = sentence(
            "sodium drawn 10 / 15 / 1994",
            vec![
                word("sodium", 0),
                word("drawn", 7),
                number("10", 13),
                {
                    let mut t = word("/", 16);
                    t.is_word = false;
                    t.is_punct = true;
                    t
                },
                number("15", 18),
                {
                    let mut t = word("/", 21);
                    t.is_word = false;
                    t.is_punct = true;
                    t
                },
                number("1994", 23),
            ],
        );
        let mut annotations = vec![Annotation::new(
            Span::new(0, 6, istr("sodium")),
            Semantic::Lab,
            Arc::clone(&sent),
        )];
        extractor().extract(&mut annotations).expect("extract");
        assert!(!annotations[0].attributes.contains_key(ATTR_LAB_VALUE));
    }
}
