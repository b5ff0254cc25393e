//! UMLS-style concepts: CUI, preferred text, TUIs and nested code maps.

use std::collections::BTreeMap;

use crate::interner::IStr;

/// Well-known dictionary scheme column names.
pub mod scheme {
    pub const CUI: &str = "CUI";
    pub const TUI: &str = "TUI";
    pub const SAB: &str = "SAB";
    pub const CODE: &str = "CODE";
    pub const PREF: &str = "PREF";
    pub const TTY: &str = "TTY";
    pub const STR: &str = "STR";
}

/// `code → param name → values` for a single coding scheme (SAB).
pub type ConceptCodes = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A dictionary concept, assembled from every row of the concept dictionary
/// carrying its CUI.
#[derive(Debug, Clone)]
pub struct Concept {
    pub cui: IStr,
    pub preferred_text: String,
    pub tuis: Vec<String>,
    /// `sab → code → param → values`.
    pub codes: BTreeMap<String, ConceptCodes>,
}

impl Concept {
    /// Start a concept from one dictionary row. `columns` is the split row,
    /// `scheme_map` maps column name to index.
    pub fn from_row(cui: IStr, columns: &[&str], scheme_map: &BTreeMap<String, usize>) -> Self {
        let preferred_text = scheme_map
            .get(scheme::PREF)
            .and_then(|idx| columns.get(*idx))
            .map(|s| s.to_string())
            .unwrap_or_default();
        Concept {
            cui,
            preferred_text,
            tuis: Vec::new(),
            codes: BTreeMap::new(),
        }
    }

    /// Merge one row into the concept: record the TUI (deduplicated,
    /// case-insensitive) and fold `(SAB, CODE, params)` into the nested code
    /// maps. Scheme columns and anything in the caller's ignore list are not
    /// params; the caller removes ignored columns from `scheme_map` up front.
    pub fn update(&mut self, tui: &str, columns: &[&str], scheme_map: &BTreeMap<String, usize>) {
        if !self.tuis.iter().any(|have| have.eq_ignore_ascii_case(tui)) {
            self.tuis.push(tui.to_string());
        }

        let sab = scheme_map
            .get(scheme::SAB)
            .and_then(|idx| columns.get(*idx))
            .copied()
            .unwrap_or("");
        if sab.is_empty() {
            return;
        }
        let code = scheme_map
            .get(scheme::CODE)
            .and_then(|idx| columns.get(*idx))
            .copied()
            .unwrap_or("");

        let codes = self.codes.entry(sab.to_string()).or_default();
        let params = codes.entry(code.to_string()).or_default();

        for (name, idx) in scheme_map {
            if matches!(
                name.as_str(),
                scheme::CUI | scheme::TUI | scheme::CODE | scheme::SAB | scheme::PREF
            ) {
                continue;
            }
            let Some(value) = columns.get(*idx) else {
                continue;
            };
            let values = params.entry(name.clone()).or_default();
            if !values.iter().any(|have| have == value) {
                values.push(value.to_string());
            }
        }
    }
}
