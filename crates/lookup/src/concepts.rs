//! Concept factory: resolves CUIs to concepts grouped by semantic.
//!
//! The concept dictionary stays resident in memory; per request only the
//! line ranges of the hit CUIs are re-parsed, merged into [`Concept`]s and
//! grouped by the TUI table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use annot::{intern, scheme, Concept, IStr, Semantic};
use fxhash::FxHashMap;
use tracing::info;

use crate::semantic_groups::semantic_group_of;
use crate::LookupError;

/// Concepts of one CUI, grouped by semantic.
pub type SemanticConcepts = HashMap<Semantic, Arc<Concept>>;

/// CUI → semantic concepts for one lookup batch.
pub type ConceptMap = HashMap<IStr, SemanticConcepts>;

pub struct ConceptFactory {
    data: String,
    offsets: FxHashMap<IStr, Vec<(usize, usize)>>,
    scheme_map: BTreeMap<String, usize>,
    cui_idx: usize,
    tui_idx: usize,
}

fn parse_tuis(field: &str) -> Vec<&str> {
    if let Some(stripped) = field.strip_prefix('[') {
        stripped.trim_end_matches(']').split(',').collect()
    } else {
        vec![field]
    }
}

impl ConceptFactory {
    /// Load the concept dictionary. `columns` is the pipe-separated scheme;
    /// `ignored` columns are dropped from the parameter set.
    pub fn load(
        config_name: &str,
        path: &Path,
        columns: &[String],
        ignored: &[String],
    ) -> Result<Self, LookupError> {
        let mut scheme_map: BTreeMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.to_uppercase(), idx))
            .collect();
        for name in ignored {
            scheme_map.remove(&name.to_uppercase());
        }
        let cui_idx = *scheme_map
            .get(scheme::CUI)
            .ok_or(LookupError::MissingColumn(scheme::CUI))?;
        let tui_idx = *scheme_map
            .get(scheme::TUI)
            .ok_or(LookupError::MissingColumn(scheme::TUI))?;

        let data = std::fs::read_to_string(path).map_err(|source| LookupError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut offsets: FxHashMap<IStr, Vec<(usize, usize)>> = FxHashMap::default();
        let mut start = 0usize;
        for line in data.split_inclusive('\n') {
            let offset = start;
            start += line.len();
            if line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            let Some(cui) = lowered.split('|').nth(cui_idx) else {
                continue;
            };
            offsets
                .entry(intern(cui))
                .or_default()
                .push((offset, line.len()));
        }

        info!(config_name, concepts = offsets.len(), "loaded concept dictionary");

        Ok(ConceptFactory {
            data,
            offsets,
            scheme_map,
            cui_idx,
            tui_idx,
        })
    }

    /// Resolve a batch of CUIs.
    pub fn concepts_for(&self, cuis: &[IStr]) -> ConceptMap {
        let mut result = ConceptMap::new();
        for cui in cuis {
            let mut grouped: HashMap<Semantic, Concept> = HashMap::new();

            for (offset, length) in self.offsets.get(cui).into_iter().flatten() {
                let line = &self.data[*offset..*offset + *length];
                let line = line.trim_end_matches(['\n', '\r']).to_lowercase();
                let columns: Vec<&str> = line.split('|').collect();
                let Some(tui_field) = columns.get(self.tui_idx) else {
                    continue;
                };

                for tui in parse_tuis(tui_field) {
                    let semantic = semantic_group_of(tui);
                    let concept = grouped.entry(semantic).or_insert_with(|| {
                        Concept::from_row(Arc::clone(cui), &columns, &self.scheme_map)
                    });
                    concept.update(tui, &columns, &self.scheme_map);
                }
            }

            let concepts: SemanticConcepts = grouped
                .into_iter()
                .map(|(semantic, concept)| (semantic, Arc::new(concept)))
                .collect();
            result.insert(Arc::clone(cui), concepts);
        }
        result
    }

    pub fn cui_index(&self) -> usize {
        self.cui_idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn factory(content: &str) -> (tempfile::TempDir, ConceptFactory) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("concepts.bsv");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(content.as_bytes()).expect("write");
        let columns: Vec<String> = ["CUI", "TUI", "SAB", "CODE", "PREF", "TTY"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let factory = ConceptFactory::load("test", &path, &columns, &[]).expect("load");
        (dir, factory)
    }

    #[test]
    fn groups_rows_by_semantic_and_merges_codes() {
        let (_dir, factory) = factory(
            "C0004057|T121|RXNORM|1191|aspirin|IN\n\
             C0004057|T121|RXNORM|1191|aspirin|BN\n\
             C0004057|T109|MSH|D001241|aspirin|MH\n",
        );

        let cui = intern("c0004057");
        let map = factory.concepts_for(&[Arc::clone(&cui)]);
        let concepts = &map[&cui];
        // T121 and T109 are both drug TUIs: one concept under Drug.
        assert_eq!(concepts.len(), 1);
        let drug = &concepts[&Semantic::Drug];
        assert_eq!(drug.tuis, vec!["t121", "t109"]);
        assert_eq!(drug.preferred_text, "aspirin");
        assert_eq!(drug.codes["rxnorm"]["1191"]["TTY"], vec!["in", "bn"]);
    }

    #[test]
    fn bracketed_tui_lists_split() {
        let (_dir, factory) = factory("C1|[T047,T184]|SNOMEDCT|123|fever|PT\n");
        let cui = intern("c1");
        let map = factory.concepts_for(&[Arc::clone(&cui)]);
        let concepts = &map[&cui];
        assert!(concepts.contains_key(&Semantic::Disorder));
        assert!(concepts.contains_key(&Semantic::Finding));
    }

    #[test]
    fn ignored_params_are_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("concepts.bsv");
        std::fs::write(&path, "C1|T047|SAB1|9|flu|PT|extra\n").expect("write");
        let columns: Vec<String> = ["CUI", "TUI", "SAB", "CODE", "PREF", "TTY", "NOTE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let factory =
            ConceptFactory::load("test", &path, &columns, &["NOTE".to_string()]).expect("load");

        let cui = intern("c1");
        let map = factory.concepts_for(&[Arc::clone(&cui)]);
        let concept = &map[&cui][&Semantic::Disorder];
        let params = &concept.codes["sab1"]["9"];
        assert!(params.contains_key("TTY"));
        assert!(!params.contains_key("NOTE"));
    }

    #[test]
    fn unknown_cui_yields_empty_groups() {
        let (_dir, factory) = factory("C1|T047|S|1|x|PT\n");
        let cui = intern("c9999");
        let map = factory.concepts_for(&[Arc::clone(&cui)]);
        assert!(map[&cui].is_empty());
    }
}
