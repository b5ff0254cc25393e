//! Document-level smoking status aggregation.

use crate::{
    CLASS_CURRENT_SMOKER, CLASS_NON_SMOKER, CLASS_PAST_SMOKER, CLASS_SMOKER, CLASS_UNKNOWN,
};

/// Counts per-sentence labels and resolves the document verdict.
#[derive(Debug, Default)]
pub struct DocumentSmokingResolver {
    unknown: usize,
    current: usize,
    past: usize,
    smoker: usize,
    non_smoker: usize,
}

impl DocumentSmokingResolver {
    pub fn add_status(&mut self, status: &str) {
        match status {
            CLASS_CURRENT_SMOKER => self.current += 1,
            CLASS_NON_SMOKER => self.non_smoker += 1,
            CLASS_PAST_SMOKER => self.past += 1,
            CLASS_SMOKER => self.smoker += 1,
            _ => self.unknown += 1,
        }
    }

    pub fn resolve(&self) -> &'static str {
        if self.unknown > 0
            && self.smoker == 0
            && self.past == 0
            && self.current == 0
            && self.non_smoker == 0
        {
            return CLASS_UNKNOWN;
        }
        if self.non_smoker >= 1 && self.past == 0 && self.current == 0 && self.smoker == 0 {
            return CLASS_NON_SMOKER;
        }
        if self.current >= 1 {
            return CLASS_CURRENT_SMOKER;
        }
        if self.past >= 1 {
            return CLASS_PAST_SMOKER;
        }
        if self.smoker >= 1 {
            return CLASS_SMOKER;
        }
        CLASS_UNKNOWN
    }
}
