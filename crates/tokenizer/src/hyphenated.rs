//! Hyphenated-term handling: closed prefix/suffix/word lists decide whether
//! a hyphen stays inside the token or splits it.

use std::collections::HashSet;

use crate::{find_next_non_alphanumeric, APOSTROPHE, HYPHEN};

pub struct Hyphenated {
    prefixes: HashSet<String>,
    suffixes: HashSet<String>,
    words: HashSet<String>,
}

const SUFFIXES: [&str; 11] = [
    "-esque", "-ette", "-fest", "-fold", "-gate", "-itis", "-less", "-most", "-o-torium", "-rama",
    "-wise",
];

const PREFIXES: [&str; 53] = [
    "e-", "a-", "u-", "x-", "agro-", "ante-", "anti-", "arch-", "be-", "bi-", "bio-", "co-",
    "counter-", "cross-", "cyber-", "de-", "eco-", "ex-", "extra-", "inter-", "intra-", "macro-",
    "mega-", "micro-", "mid-", "mini-", "multi-", "neo-", "non-", "over-", "pan-", "para-",
    "peri-", "post-", "pre-", "pro-", "pseudo-", "quasi-", "re-", "semi-", "sub-", "super-",
    "tri-", "ultra-", "un-", "uni-", "vice-", "electro-", "gasto-", "homo-", "hetero-", "ortho-",
    "phospho-",
];

const WORDS: [&str; 5] = ["mm-hm", "mm-mm", "o-kay", "uh-huh", "uh-oh"];

impl Default for Hyphenated {
    fn default() -> Self {
        Self::new()
    }
}

impl Hyphenated {
    pub fn new() -> Self {
        Hyphenated {
            prefixes: PREFIXES.iter().map(|s| s.to_string()).collect(),
            suffixes: SUFFIXES.iter().map(|s| s.to_string()).collect(),
            words: WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Length to keep together for a token containing a hyphen, or the index
    /// of the first hyphen when the token splits there.
    pub fn hyphenated_term_len(&self, runes: &[char]) -> isize {
        let Some(first_break) = runes.iter().position(|ch| *ch == HYPHEN) else {
            return -1;
        };
        if first_break == 0 {
            return -1;
        }
        if first_break + 1 == runes.len() {
            return first_break as isize;
        }

        let second_break = find_next_non_alphanumeric(runes, first_break + 1);
        let third_break = if second_break != runes.len() {
            find_next_non_alphanumeric(runes, second_break + 1) as isize
        } else {
            -1
        };

        if second_break == runes.len() {
            self.len_including_hyphens(runes, first_break, 1, second_break, third_break)
        } else if runes[second_break] == HYPHEN {
            self.len_including_hyphens(runes, first_break, 2, second_break, third_break)
        } else if runes[second_break] == APOSTROPHE || runes[second_break].is_whitespace() {
            self.len_including_hyphens(runes, first_break, 1, second_break, third_break)
        } else {
            self.len_including_hyphens(runes, first_break, 1, second_break, third_break)
        }
    }

    /// Length of a known hyphenated suffix starting at `position`
    /// (`-less`, `-o-torium`, …), or −1.
    pub fn hyphenated_suffix_len(&self, runes: &[char], position: usize) -> isize {
        let mut next = find_next_non_alphanumeric(runes, position + 1);
        let rest: String = runes[position..].iter().collect();
        if rest.starts_with("-o-") {
            next = find_next_non_alphanumeric(runes, position + 3);
        }
        let possible: String = runes[position..next].iter().collect();
        if self.suffixes.contains(&possible) {
            possible.chars().count() as isize
        } else {
            -1
        }
    }

    fn len_including_hyphens(
        &self,
        runes: &[char],
        first_hyphen: usize,
        hyphens_to_keep: usize,
        second_break: usize,
        third_break: isize,
    ) -> isize {
        let collect = |from: usize, to: usize| -> String { runes[from..to].iter().collect() };

        if hyphens_to_keep > 2 || hyphens_to_keep < 1 {
            return -1;
        }

        if hyphens_to_keep == 2 {
            let possible_suffix = collect(first_hyphen, third_break as usize);
            if self.suffixes.contains(&possible_suffix) {
                return third_break;
            }
        }

        let possible_suffix = collect(first_hyphen, second_break);
        if self.suffixes.contains(&possible_suffix) {
            if third_break > second_break as isize {
                let tail = collect(second_break, third_break as usize);
                if self.suffixes.contains(&tail) {
                    return third_break;
                }
            }
            return second_break as isize;
        }

        if hyphens_to_keep > 1 {
            let head = collect(0, second_break);
            let tail = collect(second_break, third_break as usize);
            if self.words.contains(&head) && self.suffixes.contains(&tail) {
                return third_break;
            }
        }

        let possible_prefix = collect(0, first_hyphen + 1);
        let prefix_hit = self.prefixes.contains(&possible_prefix);

        if prefix_hit && hyphens_to_keep > 1 {
            let rest = collect(first_hyphen + 1, third_break as usize);
            if self.words.contains(&rest) {
                return third_break;
            }
        }

        if hyphens_to_keep == 1 && prefix_hit {
            return second_break as isize;
        }

        if hyphens_to_keep == 2 && prefix_hit {
            let tail = collect(second_break, third_break as usize);
            if self.suffixes.contains(&tail) {
                return third_break;
            }
            return second_break as isize;
        }

        let whole = collect(0, second_break);
        if self.words.contains(&whole) {
            return second_break as isize;
        }

        first_hyphen as isize
    }
}
