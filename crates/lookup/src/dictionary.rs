//! Term dictionary: build the rare-word index from a BSV file, with a JSON
//! cache keyed by the file's content hash.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use annot::{intern, scheme, BsvReader, IStr};
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::rare_word::{build_rare_word_map, RareWordTerm, RareWordTermRecord};
use crate::term_tokenizer::TermTokenizer;
use crate::LookupError;

/// The rare-word index over one term dictionary.
#[derive(Debug)]
pub struct Dictionary {
    map: FxHashMap<IStr, Vec<Arc<RareWordTerm>>>,
}

impl Dictionary {
    /// Load a dictionary. When a cache file for this dictionary + scheme
    /// exists it is loaded; otherwise the index is built from the BSV and
    /// the cache written.
    pub fn load(config_name: &str, path: &Path, columns: &[String]) -> Result<Self, LookupError> {
        let cache_path = index_cache_path(path, columns)?;

        if cache_path.exists() {
            info!(config_name, cache = %cache_path.display(), "loading dictionary index from cache");
            let map = load_cache(&cache_path)?;
            info!(config_name, terms = map.len(), "dictionary loaded");
            return Ok(Dictionary { map });
        }

        info!(config_name, path = %path.display(), "building dictionary index");
        let map = build_index(path, columns)?;
        if let Err(error) = write_cache(&cache_path, &map) {
            // The cache is an optimization; a failed write only costs the
            // next startup a rebuild.
            tracing::warn!(cache = %cache_path.display(), %error, "could not write index cache");
        }
        info!(config_name, terms = map.len(), "dictionary loaded");
        Ok(Dictionary { map })
    }

    pub fn from_map(map: FxHashMap<IStr, Vec<Arc<RareWordTerm>>>) -> Self {
        Dictionary { map }
    }

    /// Candidate terms for any of `words` (typically a token's text and
    /// lemma).
    pub fn candidates<'d>(
        &'d self,
        words: &'d [IStr],
    ) -> impl Iterator<Item = &'d Arc<RareWordTerm>> + 'd {
        words
            .iter()
            .filter_map(move |word| self.map.get(word))
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn column_index(columns: &[String], name: &'static str) -> Result<usize, LookupError> {
    columns
        .iter()
        .position(|column| column.eq_ignore_ascii_case(name))
        .ok_or(LookupError::MissingColumn(name))
}

fn build_index(
    path: &Path,
    columns: &[String],
) -> Result<FxHashMap<IStr, Vec<Arc<RareWordTerm>>>, LookupError> {
    let cui_idx = column_index(columns, scheme::CUI)?;
    let str_idx = column_index(columns, scheme::STR)?;

    let tokenizer = TermTokenizer::new();
    let mut reader = BsvReader::open(path, &[cui_idx, str_idx])?;
    let mut terms = Vec::new();

    while let Some(row) = reader.next_row()? {
        let (Some(cui), Some(term_text)) = (row.get(cui_idx), row.get(str_idx)) else {
            continue;
        };
        let tokens = tokenizer.tokenize(term_text);
        if tokens.is_empty() {
            continue;
        }
        terms.push(RareWordTerm {
            tokens: tokens.iter().map(|t| intern(t)).collect(),
            text_length: term_text.len() as u32,
            cui: intern(cui),
            rare_word_index: 0,
        });
    }

    Ok(build_rare_word_map(terms))
}

fn index_cache_path(path: &Path, columns: &[String]) -> Result<PathBuf, LookupError> {
    let bytes = std::fs::read(path).map_err(|source| LookupError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(columns.join("").as_bytes());
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dictionary".to_string());
    let dir = path
        .parent()
        .map(|p| p.join("tmp_index"))
        .unwrap_or_else(|| PathBuf::from("tmp_index"));
    Ok(dir.join(format!("{stem}{}.json", &digest[..16])))
}

fn write_cache(
    path: &Path,
    map: &FxHashMap<IStr, Vec<Arc<RareWordTerm>>>,
) -> Result<(), LookupError> {
    // BTreeMap keeps the cache file deterministic across rebuilds.
    let records: BTreeMap<String, Vec<RareWordTermRecord>> = map
        .iter()
        .map(|(key, terms)| {
            (
                key.to_string(),
                terms.iter().map(|t| RareWordTermRecord::from(t.as_ref())).collect(),
            )
        })
        .collect();
    let data = serde_json::to_vec(&records)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LookupError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    std::fs::write(path, data).map_err(|source| LookupError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn load_cache(path: &Path) -> Result<FxHashMap<IStr, Vec<Arc<RareWordTerm>>>, LookupError> {
    let data = std::fs::read(path).map_err(|source| LookupError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records: BTreeMap<String, Vec<RareWordTermRecord>> = serde_json::from_slice(&data)?;

    let mut map = FxHashMap::default();
    for (key, terms) in records {
        let key = intern(&key);
        let terms = terms
            .into_iter()
            .map(|record| {
                Arc::new(RareWordTerm {
                    tokens: record.tokens.iter().map(|t| intern(t)).collect(),
                    text_length: record.text_length,
                    cui: intern(&record.cui),
                    rare_word_index: record.rare_word_index,
                })
            })
            .collect();
        map.insert(key, terms);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_dict(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("terms.bsv");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(content.as_bytes()).expect("write");
        path
    }

    fn scheme_columns() -> Vec<String> {
        vec!["CUI".to_string(), "STR".to_string()]
    }

    #[test]
    fn builds_index_and_reloads_from_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_dict(
            dir.path(),
            "C0004057|aspirin\nC0024117|lung cancer\nC0024117|cancer of lung\n",
        );

        let dict = Dictionary::load("test", &path, &scheme_columns()).expect("build");
        assert_eq!(dict.len(), 3);

        let words = vec![intern("aspirin")];
        let hits: Vec<_> = dict.candidates(&words).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(&*hits[0].cui, "c0004057");

        // Second load goes through the cache and yields the same index.
        let cached = Dictionary::load("test", &path, &scheme_columns()).expect("cache");
        assert_eq!(cached.len(), dict.len());
        let hits: Vec<_> = cached.candidates(&words).collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn missing_scheme_column_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_dict(dir.path(), "C1|x\n");
        let err = Dictionary::load("test", &path, &["CUI".to_string()]).unwrap_err();
        assert!(matches!(err, LookupError::MissingColumn("STR")));
    }

    #[test]
    fn multi_token_terms_key_on_rare_word() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_dict(
            dir.path(),
            "C1|lung cancer\nC2|lung disease\nC3|lung abscess\n",
        );
        let dict = Dictionary::load("test", &path, &scheme_columns()).expect("build");

        let words = vec![intern("cancer")];
        let hits: Vec<_> = dict.candidates(&words).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rare_word_index, 1);
        assert_eq!(hits[0].token_count(), 2);
    }
}
