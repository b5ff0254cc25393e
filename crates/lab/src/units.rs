//! Lab unit recognition over a rune prefix tree.

use std::path::Path;

use annot::{istr, shape_of, CharPrefixTree, HasSpan, Span, Token};

use crate::LabError;

/// The unit list as a rune prefix tree: `Split` cuts fused `45mg/dL`
/// tokens, `execute` reads a unit off a following token run.
pub struct LabUnits {
    tree: CharPrefixTree,
}

impl LabUnits {
    pub fn load(path: &Path) -> Result<Self, LabError> {
        let content = std::fs::read_to_string(path).map_err(|source| LabError::Units {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_units(content.lines()))
    }

    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = CharPrefixTree::new();
        for unit in units {
            let unit = unit.trim().to_lowercase();
            if !unit.is_empty() {
                tree.insert(&unit);
            }
        }
        LabUnits { tree }
    }

    /// Longest unit readable from the start of `items`, across token
    /// boundaries. Returns a synthetic token covering the matched span with
    /// the canonical unit text.
    pub fn execute(&self, items: &[&Span]) -> Option<Token> {
        let mut cursor = self.tree.root();
        let mut found: Option<Token> = None;

        for span in items {
            for ch in span.text.chars() {
                match self.tree.step(cursor, ch) {
                    Some(next) => cursor = next,
                    None => return found,
                }
            }
            if let Some(text) = self.tree.terminal(cursor) {
                let begin = items[0].begin;
                let mut token = Token::new(Span::new(begin, span.end, istr(text)));
                token.is_word = true;
                found = Some(token);
            }
        }
        found
    }

    /// Split tokens that fuse a number with a unit (`45mg/dL` → `45`,
    /// `mg/dL`), re-deriving text, shape and flags for both halves.
    pub fn split(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut result: Vec<Token> = Vec::with_capacity(tokens.len());

        for token in tokens {
            let mut number_token = token.clone();
            if token.span.text.chars().count() >= 2 {
                let runes: Vec<char> = token.span.text.chars().collect();
                if runes[0].is_numeric() {
                    let mut cursor = self.tree.root();
                    let mut unit_len = 0i32;
                    let mut failed = false;

                    for (idx, ch) in runes.iter().enumerate() {
                        if self.tree.is_root(cursor) && ch.is_numeric() {
                            continue;
                        }
                        if idx > 0 && !ch.is_numeric() {
                            match self.tree.step(cursor, *ch) {
                                Some(next) => {
                                    unit_len += 1;
                                    cursor = next;
                                }
                                None => {
                                    failed = true;
                                    break;
                                }
                            }
                        }
                    }

                    let number_len = runes.len() as i32 - unit_len;
                    if !failed && !self.tree.is_root(cursor) && number_len > 0 {
                        let shaped: Vec<char> = number_token.shaped_text().chars().collect();

                        let unit_text: String = shaped[number_len as usize..].iter().collect();
                        let mut unit_token = Token::new(Span::new(
                            number_token.span.end - unit_len,
                            number_token.span.end,
                            istr(&unit_text.to_lowercase()),
                        ));
                        unit_token.shape = shape_of(&unit_text);
                        unit_token.is_word = true;
                        result.push(unit_token);

                        let number_text: String = shaped[..number_len as usize].iter().collect();
                        number_token.span.end = number_token.span.begin + number_len;
                        number_token.span.text = istr(&number_text.to_lowercase());
                        number_token.shape = shape_of(&number_text);
                        number_token.is_number = true;
                        number_token.is_word = false;
                    }
                }
            }
            result.push(number_token);
        }

        result.sort_by(|a, b| a.span().begin.cmp(&b.span().begin));
        result
    }
}
