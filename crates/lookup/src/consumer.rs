//! Match consumption: group hits by semantic, apply the precision-mode
//! preside rule and build annotations.

use std::collections::BTreeSet;
use std::sync::Arc;

use annot::{Annotation, IStr, Semantic, Sentence, Span};

use crate::concepts::ConceptMap;

/// Drop spans strictly contained in a longer span. The containment test is
/// deliberately asymmetric: equal spans are kept, matching the shipped rule.
pub fn create_preside_terms(spans: Vec<Span>, cuis: Vec<Vec<IStr>>) -> (Vec<Span>, Vec<Vec<IStr>>) {
    let count = spans.len();
    let mut discard = vec![false; count];

    for i in 0..count {
        let a = &spans[i];
        for j in i + 1..count {
            let b = &spans[j];
            if (b.begin <= a.begin && b.end > a.end) || (b.begin < a.begin && b.end >= a.end) {
                discard[i] = true;
                break;
            }
            if (a.begin <= b.begin && a.end > b.end) || (a.begin < b.begin && a.end >= b.end) {
                discard[j] = true;
            }
        }
    }

    let mut kept_spans = Vec::with_capacity(count);
    let mut kept_cuis = Vec::with_capacity(count);
    for (idx, span) in spans.into_iter().enumerate() {
        if !discard[idx] {
            kept_spans.push(span);
            kept_cuis.push(cuis[idx].clone());
        }
    }
    (kept_spans, kept_cuis)
}

/// Builds annotations from matched spans.
pub struct Consumer {
    precision_mode: bool,
}

impl Consumer {
    pub fn new(precision_mode: bool) -> Self {
        Consumer { precision_mode }
    }

    pub fn consume(
        &self,
        spans: &[Span],
        span_cuis: &[Vec<IStr>],
        concept_map: &ConceptMap,
        sentence: &Arc<Sentence>,
    ) -> Vec<Annotation> {
        let semantics: BTreeSet<Semantic> = concept_map
            .values()
            .flat_map(|concepts| concepts.keys().copied())
            .collect();

        let mut annotations = Vec::new();
        for semantic in semantics {
            let mut semantic_spans: Vec<Span> = Vec::new();
            let mut semantic_cuis: Vec<Vec<IStr>> = Vec::new();

            for (span, cuis) in spans.iter().zip(span_cuis.iter()) {
                let matching: Vec<IStr> = cuis
                    .iter()
                    .filter(|cui| {
                        concept_map
                            .get(*cui)
                            .map(|concepts| concepts.contains_key(&semantic))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                if !matching.is_empty() {
                    semantic_spans.push(span.clone());
                    semantic_cuis.push(matching);
                }
            }

            let (semantic_spans, semantic_cuis) = if self.precision_mode {
                create_preside_terms(semantic_spans, semantic_cuis)
            } else {
                (semantic_spans, semantic_cuis)
            };

            for (span, cuis) in semantic_spans.into_iter().zip(semantic_cuis) {
                let mut annotation = Annotation::new(span, semantic, Arc::clone(sentence));
                for cui in &cuis {
                    if let Some(concept) = concept_map.get(cui).and_then(|c| c.get(&semantic)) {
                        annotation.concepts.push(Arc::clone(concept));
                    }
                }
                annotations.push(annotation);
            }
        }
        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::SemanticConcepts;
    use annot::{intern, istr, Concept};
    use std::collections::BTreeMap;

    fn span(begin: i32, end: i32) -> Span {
        Span::new(begin, end, istr("x"))
    }

    fn concept(cui: &IStr) -> Arc<Concept> {
        Arc::new(Concept {
            cui: Arc::clone(cui),
            preferred_text: "x".into(),
            tuis: vec!["t047".into()],
            codes: BTreeMap::new(),
        })
    }

    fn concept_map(cui: &IStr, semantic: Semantic) -> ConceptMap {
        let mut concepts = SemanticConcepts::new();
        concepts.insert(semantic, concept(cui));
        let mut map = ConceptMap::new();
        map.insert(Arc::clone(cui), concepts);
        map
    }

    fn sentence() -> Arc<Sentence> {
        Arc::new(Sentence::new(Span::new(0, 30, istr("x"))))
    }

    #[test]
    fn preside_discards_strictly_contained_spans() {
        let spans = vec![span(5, 11), span(0, 11)];
        let cuis = vec![vec![intern("c1")], vec![intern("c2")]];
        let (kept, kept_cuis) = create_preside_terms(spans, cuis);
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].begin, kept[0].end), (0, 11));
        assert_eq!(&*kept_cuis[0][0], "c2");
    }

    #[test]
    fn preside_keeps_equal_spans() {
        let spans = vec![span(0, 11), span(0, 11)];
        let cuis = vec![vec![intern("c1")], vec![intern("c2")]];
        let (kept, _) = create_preside_terms(spans, cuis);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn precision_mode_gates_the_preside_rule() {
        let cui = intern("c0242379");
        let map = concept_map(&cui, Semantic::Disorder);
        let spans = vec![span(5, 11), span(0, 11)];
        let cuis = vec![vec![Arc::clone(&cui)], vec![Arc::clone(&cui)]];

        let with = Consumer::new(true).consume(&spans, &cuis, &map, &sentence());
        assert_eq!(with.len(), 1);
        assert_eq!((with[0].span.begin, with[0].span.end), (0, 11));

        let without = Consumer::new(false).consume(&spans, &cuis, &map, &sentence());
        assert_eq!(without.len(), 2);
    }

    #[test]
    fn annotations_carry_semantic_concepts_and_sentence() {
        let cui = intern("c0004057");
        let map = concept_map(&cui, Semantic::Drug);
        let spans = vec![span(9, 16)];
        let cuis = vec![vec![Arc::clone(&cui)]];
        let sent = sentence();

        let annotations = Consumer::new(false).consume(&spans, &cuis, &map, &sent);
        assert_eq!(annotations.len(), 1);
        let annotation = &annotations[0];
        assert_eq!(annotation.semantic, Semantic::Drug);
        assert_eq!(annotation.concepts.len(), 1);
        assert!(Arc::ptr_eq(&annotation.sentence, &sent));
        assert!(annotation.attributes.is_empty());
        assert_eq!(annotation.name(), "MedicationMention");
    }

    #[test]
    fn spans_without_matching_semantic_are_dropped() {
        let cui = intern("c1");
        let map = concept_map(&cui, Semantic::Drug);
        let spans = vec![span(0, 4)];
        let other = intern("c-unknown");
        let cuis = vec![vec![other]];
        let annotations = Consumer::new(false).consume(&spans, &cuis, &map, &sentence());
        assert!(annotations.is_empty());
    }
}
