//! Beam search over tag sequences.

use std::collections::BinaryHeap;

use annot::Token;

use crate::context::ContextGenerator;
use crate::model::PosModel;
use crate::SequenceValidator;

const MIN_SEQUENCE_SCORE: f64 = -100000.0;

/// A partial tag sequence with its cumulative log score.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    pub score: f64,
    pub outcomes: Vec<String>,
    pub probs: Vec<f64>,
}

impl Sequence {
    fn expand_from(src: &Sequence, outcome: &str, score: f64) -> Sequence {
        let mut outcomes = Vec::with_capacity(src.outcomes.len() + 1);
        outcomes.extend_from_slice(&src.outcomes);
        outcomes.push(outcome.to_string());

        let mut probs = Vec::with_capacity(src.probs.len() + 1);
        probs.extend_from_slice(&src.probs);
        probs.push(score);

        Sequence {
            score: src.score + score.ln(),
            outcomes,
            probs,
        }
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for Sequence {}

impl PartialOrd for Sequence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sequence {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// Fixed-width beam search.
pub struct BeamSearch {
    size: usize,
}

impl BeamSearch {
    pub fn new(size: usize) -> Self {
        BeamSearch { size }
    }

    pub fn search(
        &self,
        tokens: &[&Token],
        model: &PosModel,
        context: &ContextGenerator,
        validator: &SequenceValidator,
    ) -> Option<Sequence> {
        let mut prev: BinaryHeap<Sequence> = BinaryHeap::with_capacity(self.size);
        let mut next: BinaryHeap<Sequence> = BinaryHeap::with_capacity(self.size);
        prev.push(Sequence::default());

        for i in 0..tokens.len() {
            let width = prev.len().min(self.size);

            for _ in 0..width {
                let Some(top) = prev.pop() else {
                    break;
                };
                let contexts = context.context(i, tokens, &top.outcomes);
                let scores = model.eval(&contexts);

                let mut sorted = scores.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let cutoff_idx = sorted.len().saturating_sub(self.size);
                let cutoff = sorted.get(cutoff_idx).copied().unwrap_or(0.0);

                for (p, score) in scores.iter().enumerate() {
                    if *score < cutoff {
                        continue;
                    }
                    let outcome = &model.outcomes[p];
                    if validator.valid(i, tokens, outcome) {
                        let candidate = Sequence::expand_from(&top, outcome, *score);
                        if candidate.score > MIN_SEQUENCE_SCORE {
                            next.push(candidate);
                        }
                    }
                }

                // Beam went dry: re-admit every outcome regardless of cutoff.
                if next.is_empty() {
                    for (p, score) in scores.iter().enumerate() {
                        let outcome = &model.outcomes[p];
                        if validator.valid(i, tokens, outcome) {
                            let candidate = Sequence::expand_from(&top, outcome, *score);
                            if candidate.score > MIN_SEQUENCE_SCORE {
                                next.push(candidate);
                            }
                        }
                    }
                }
            }

            prev.clear();
            std::mem::swap(&mut prev, &mut next);
        }

        prev.pop()
    }
}
