//! Contraction handling: apostrophe-leading words, multi-token single words
//! and contraction endings split off mid-token.

use std::collections::HashMap;

use crate::hyphenated::Hyphenated;
use crate::{find_next_non_alphanumeric, APOSTROPHE, HYPHEN};

/// Result of finding a contraction in the middle of a token: the word part
/// length and the contraction part length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractionSplit {
    pub word_token_len: isize,
    pub contraction_token_len: isize,
}

pub struct Contractions {
    multi_token_lookup: HashMap<String, usize>,
    len_token_1: [isize; 7],
    len_token_2: [isize; 7],
    len_token_3: [isize; 7],
    possible_endings: Vec<Vec<char>>,
    starting_with_apostrophe: Vec<Vec<char>>,
    full_words_not_to_break: Vec<Vec<char>>,
    letters_after_apostrophe: Vec<char>,
}

const MULTI_TOKEN_WORDS: [&str; 7] = [
    "cannot", "gonna", "gotta", "lemme", "wanna", "whaddya", "whatcha",
];

fn to_rune_vecs(words: &[&str]) -> Vec<Vec<char>> {
    words.iter().map(|w| w.chars().collect()).collect()
}

fn starts_with(runes: &[char], prefix: &[char]) -> bool {
    runes.len() >= prefix.len() && &runes[..prefix.len()] == prefix
}

fn starts_without_following_letter(runes: &[char], prefix: &[char]) -> bool {
    if !starts_with(runes, prefix) {
        return false;
    }
    if runes.len() == prefix.len() {
        return true;
    }
    !runes[prefix.len()].is_alphabetic()
}

impl Default for Contractions {
    fn default() -> Self {
        Self::new()
    }
}

impl Contractions {
    pub fn new() -> Self {
        let possible_endings = to_rune_vecs(&["'s", "'ve", "'re", "'ll", "'d", "'n", "n't"]);
        let mut letters_after_apostrophe = Vec::new();
        for ending in &possible_endings {
            if let Some(idx) = ending.iter().position(|ch| *ch == APOSTROPHE) {
                if idx + 1 < ending.len() {
                    letters_after_apostrophe.push(ending[idx + 1]);
                }
            }
        }

        Contractions {
            multi_token_lookup: MULTI_TOKEN_WORDS
                .iter()
                .enumerate()
                .map(|(i, w)| (w.to_string(), i))
                .collect(),
            len_token_1: [3, 3, 3, 3, 3, 3, 3],
            len_token_2: [3, 2, 2, 2, 2, 2, 1],
            len_token_3: [0, 0, 0, 0, 0, 2, 3],
            possible_endings,
            starting_with_apostrophe: to_rune_vecs(&["'tis", "'twas"]),
            full_words_not_to_break: to_rune_vecs(&["p'yongyang"]),
            letters_after_apostrophe,
        }
    }

    /// `'tis` / `'twas` at the current position (not followed by a letter).
    pub fn starts_with_apostrophe(&self, current: usize, runes: &[char]) -> bool {
        let rest = &runes[current..];
        self.starting_with_apostrophe
            .iter()
            .any(|word| starts_without_following_letter(rest, word))
    }

    /// Length of a single-quote word to keep together (`90's`,
    /// `p'yongyang`), or of the part before the apostrophe to break at.
    pub fn single_quote_word_len(&self, runes: &[char], hyphenated: &Hyphenated) -> isize {
        let Some(first_break) = runes.iter().position(|ch| *ch == APOSTROPHE) else {
            return -1;
        };
        if first_break == 0 {
            return -1;
        }
        if first_break + 1 == runes.len() {
            return first_break as isize;
        }

        let second_break = find_next_non_alphanumeric(runes, first_break + 1);

        if self.break_at_apostrophe(runes, first_break) {
            return first_break as isize;
        }

        if second_break == runes.len() {
            return second_break as isize;
        }

        if runes[second_break] != HYPHEN {
            second_break as isize
        } else {
            let suffix_len = hyphenated.hyphenated_suffix_len(runes, second_break);
            if suffix_len > 0 {
                (second_break as isize) + suffix_len
            } else {
                second_break as isize
            }
        }
    }

    pub fn first_token_len(&self, runes: &[char]) -> isize {
        self.multi_token_len(runes, &self.len_token_1)
    }

    pub fn second_token_len(&self, runes: &[char]) -> isize {
        self.multi_token_len(runes, &self.len_token_2)
    }

    pub fn third_token_len(&self, runes: &[char]) -> isize {
        self.multi_token_len(runes, &self.len_token_3)
    }

    fn multi_token_len(&self, runes: &[char], table: &[isize; 7]) -> isize {
        let word: String = runes.iter().collect();
        match self.multi_token_lookup.get(&word) {
            Some(idx) => table[*idx],
            None => -1,
        }
    }

    /// Contraction ending at the next apostrophe: splits `isn't` into
    /// `is` + `n't`, `patient's` into `patient` + `'s`, and so on.
    pub fn middle_of_contraction(
        &self,
        position: usize,
        next_non_letter_digit: usize,
        runes: &[char],
    ) -> Option<ContractionSplit> {
        if runes.len() < position + 3 {
            return None;
        }

        let apostrophe_position = runes
            .iter()
            .enumerate()
            .skip(position)
            .find(|(_, ch)| **ch == APOSTROPHE)
            .map(|(i, _)| i)?;

        if next_non_letter_digit != apostrophe_position {
            return None;
        }

        if apostrophe_position < 1
            || apostrophe_position >= runes.len() - 1
            || starts_with(runes, &['n', '\'', 't'])
        {
            return None;
        }

        let letter_after = runes[apostrophe_position + 1];
        if !self.letters_after_apostrophe.contains(&letter_after) {
            return None;
        }

        let subsequent = find_next_non_alphanumeric(runes, apostrophe_position + 1);
        let rest = &runes[apostrophe_position..subsequent];

        let prev = runes[apostrophe_position - 1];
        let neg: Vec<char> = "n't".chars().collect();

        for ending in &self.possible_endings {
            let is_neg = *ending == neg;
            let mut len_after_apostrophe = ending.len() as isize - 1;
            if is_neg {
                len_after_apostrophe -= 1;
            }
            if (runes.len() as isize) < apostrophe_position as isize + len_after_apostrophe {
                continue;
            }

            if is_neg
                && prev == 'n'
                && runes[apostrophe_position + 1] == 't'
                && runes.len() == apostrophe_position + 2
            {
                return Some(ContractionSplit {
                    contraction_token_len: 3,
                    word_token_len: apostrophe_position as isize - 1 - position as isize,
                });
            } else if rest == ending.as_slice() {
                return Some(ContractionSplit {
                    contraction_token_len: ending.len() as isize,
                    word_token_len: apostrophe_position as isize - position as isize,
                });
            }

            if runes.len() as isize == apostrophe_position as isize + len_after_apostrophe + 1 {
                continue;
            }

            let after_idx = position as isize + len_after_apostrophe + 1;
            let after = if (rest.len() as isize) <= after_idx {
                '\0'
            } else {
                rest[after_idx as usize]
            };

            if starts_with(rest, ending) && prev.is_alphabetic() && !after.is_alphabetic() {
                return Some(ContractionSplit {
                    contraction_token_len: ending.len() as isize,
                    word_token_len: apostrophe_position as isize - position as isize,
                });
            } else if is_neg
                && prev == 'n'
                && starts_with(rest, &['\'', 't'])
                && !after.is_alphabetic()
            {
                return Some(ContractionSplit {
                    contraction_token_len: 3,
                    word_token_len: apostrophe_position as isize - 1 - position as isize,
                });
            }
        }
        None
    }

    /// Whether the apostrophe at `position` breaks the token. Possessive
    /// digit runs (`90's`) and the keep-together word list do not break.
    fn break_at_apostrophe(&self, runes: &[char], position: usize) -> bool {
        if runes.len() == position + 1 {
            return true;
        }
        if position == 0 {
            return false;
        }

        if mostly_digits(&runes[0..position]) && runes[position + 1] == 's' {
            if runes.len() < position + 3 {
                return false;
            }
            let after = runes[position + 2];
            return after.is_numeric() || after.is_alphabetic();
        }
        for word in &self.full_words_not_to_break {
            if word.as_slice() == runes {
                return false;
            }
        }
        true
    }
}

// Digit check skipping the first rune, as the possessive-digit rule allows a
// leading letter (`90's` and `A90's` both qualify).
fn mostly_digits(runes: &[char]) -> bool {
    runes.iter().skip(1).all(|ch| ch.is_numeric())
}
