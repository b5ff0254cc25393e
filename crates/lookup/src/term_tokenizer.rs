//! Tokenizer for dictionary terms: whitespace split, then per-token breaks
//! that keep known prefix/suffix hyphens, `'s` possessives and decimal
//! points together.

use std::collections::HashSet;

use once_cell::sync::Lazy;

static PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "e", "a", "u", "x", "agro", "ante", "anti", "arch", "be", "bi", "bio", "co", "counter",
        "cross", "cyber", "de", "eco", "ex", "extra", "inter", "intra", "macro", "mega", "micro",
        "mid", "mini", "multi", "neo", "non", "over", "pan", "para", "peri", "post", "pre", "pro",
        "pseudo", "quasi", "re", "semi", "sub", "super", "tri", "ultra", "un", "uni", "vice",
        "electro", "gasto", "homo", "hetero", "ortho", "phospho",
    ]
    .into_iter()
    .collect()
});

static SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "esque", "ette", "fest", "fold", "gate", "itis", "less", "most", "o-torium", "rama",
        "wise",
    ]
    .into_iter()
    .collect()
});

#[derive(Default)]
pub struct TermTokenizer;

impl TermTokenizer {
    pub fn new() -> Self {
        TermTokenizer
    }

    pub fn tokenize(&self, term: &str) -> Vec<String> {
        if term.is_empty() {
            return Vec::new();
        }
        let mut tokens = Vec::new();
        for split in term.split_whitespace() {
            tokens.extend(split_word(split));
        }
        tokens
    }
}

fn split_word(word: &str) -> Vec<String> {
    let runes: Vec<char> = word.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    let mut idx = 0usize;
    while idx < runes.len() {
        let ch = runes[idx];

        if ch.is_alphabetic() || ch.is_numeric() {
            current.push(ch);
            idx += 1;
            continue;
        }

        if ch == '-' && (is_prefix(&current) || is_suffix(&runes, idx + 1)) {
            current.push(ch);
            idx += 1;
            continue;
        }

        if (ch == '\'' && is_owner_apostrophe(&runes, idx + 1))
            || (ch == '.' && is_number_decimal(&runes, idx + 1))
        {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            current.push(ch);
            idx += 1;
            continue;
        }

        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        tokens.push(ch.to_string());
        idx += 1;
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_prefix(word: &str) -> bool {
    PREFIXES.contains(word)
}

fn is_suffix(runes: &[char], start: usize) -> bool {
    if runes.len() <= start {
        return false;
    }
    let next_term = next_char_term(&runes[start..]);
    if next_term.is_empty() {
        return false;
    }
    SUFFIXES.contains(next_term.as_str())
}

fn is_owner_apostrophe(runes: &[char], start: usize) -> bool {
    runes.len() == start + 1 && runes[start] == 's'
}

fn is_number_decimal(runes: &[char], start: usize) -> bool {
    runes.len() == start + 1 && runes[start].is_numeric()
}

fn next_char_term(runes: &[char]) -> String {
    let mut out = String::new();
    for ch in runes {
        if !(ch.is_alphabetic() || ch.is_numeric()) {
            break;
        }
        out.push(*ch);
    }
    out
}
