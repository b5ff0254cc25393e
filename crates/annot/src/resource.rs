//! Readers for the plain-text resource formats: line sets, line lists,
//! two-column `|` maps and the bar-separated dictionary files.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read resource {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rule in {path}: expected 2 columns, got {columns}")]
    MalformedRule { path: String, columns: usize },
}

fn open(path: &Path) -> Result<BufReader<File>, ResourceError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ResourceError::Io {
            path: path.display().to_string(),
            source,
        })
}

fn lines(path: &Path) -> Result<impl Iterator<Item = Result<String, ResourceError>>, ResourceError> {
    let path_str = path.display().to_string();
    Ok(open(path)?.lines().map(move |line| {
        line.map_err(|source| ResourceError::Io {
            path: path_str.clone(),
            source,
        })
    }))
}

/// One entry per line.
pub fn read_set(path: &Path) -> Result<HashSet<String>, ResourceError> {
    let mut set = HashSet::new();
    for line in lines(path)? {
        set.insert(line?);
    }
    Ok(set)
}

/// One entry per line, order preserved.
pub fn read_list(path: &Path) -> Result<Vec<String>, ResourceError> {
    let mut list = Vec::new();
    for line in lines(path)? {
        list.push(line?);
    }
    Ok(list)
}

/// `key|value` per line; later keys win.
pub fn read_map(path: &Path) -> Result<HashMap<String, String>, ResourceError> {
    let mut map = HashMap::new();
    for line in lines(path)? {
        let line = line?;
        let mut parts = line.splitn(2, '|');
        let key = parts.next().unwrap_or_default().to_string();
        let value = parts.next().unwrap_or_default().to_string();
        map.insert(key, value);
    }
    Ok(map)
}

/// `suffix|replacement` rewrite rules, order preserved.
pub fn read_rule_list(path: &Path) -> Result<Vec<(String, String)>, ResourceError> {
    let mut rules = Vec::new();
    for line in lines(path)? {
        let line = line?;
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() != 2 {
            return Err(ResourceError::MalformedRule {
                path: path.display().to_string(),
                columns: parts.len(),
            });
        }
        rules.push((parts[0].to_string(), parts[1].to_string()));
    }
    Ok(rules)
}

/// Reader for bar-separated dictionary files. Lowercases rows, skips `#` and
/// `//` comment lines and drops duplicate rows, where row identity is decided
/// by the caller-supplied key columns.
pub struct BsvReader {
    reader: BufReader<File>,
    path: String,
    key_columns: Vec<usize>,
    seen: HashSet<u64>,
}

impl BsvReader {
    pub fn open(path: &Path, key_columns: &[usize]) -> Result<Self, ResourceError> {
        Ok(BsvReader {
            reader: open(path)?,
            path: path.display().to_string(),
            key_columns: key_columns.to_vec(),
            seen: HashSet::new(),
        })
    }

    fn row_key(&self, columns: &[String]) -> u64 {
        let mut hasher = DefaultHasher::new();
        for idx in &self.key_columns {
            columns.get(*idx).map(String::as_str).unwrap_or("").hash(&mut hasher);
            '|'.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Next unique row, split on `|`. `Ok(None)` at end of file.
    pub fn next_row(&mut self) -> Result<Option<Vec<String>>, ResourceError> {
        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|source| ResourceError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            if line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']).to_lowercase();
            if trimmed.is_empty() {
                continue;
            }
            let columns: Vec<String> = trimmed.split('|').map(str::to_string).collect();
            let key = self.row_key(&columns);
            if self.seen.insert(key) {
                return Ok(Some(columns));
            }
        }
    }
}
