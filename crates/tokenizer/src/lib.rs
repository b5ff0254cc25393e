//! PTB-style tokenizer.
//!
//! A single forward pass over the runes of a sentence. At every starting
//! position the longest legal token wins, chosen from a prioritised list:
//! newline runs, numbers, ellipses, contractions, URLs, email addresses,
//! telephone/postal shapes, dotted abbreviations, comma numbers, hyphenated
//! terms, mid-token contractions, then a default break at the next
//! non-alphanumeric rune.
//!
//! Classification happens over the lowercased runes; the token text is
//! sliced from the original sentence so the shape string can retain the
//! casing.

mod contractions;
mod hyphenated;

use annot::{intern, shape_of, Sentence, Span, Token};
use thiserror::Error;

pub use contractions::Contractions;
pub use hyphenated::Hyphenated;

const NOT_SET: isize = -999;

const PERIOD: char = '.';
const COMMA: char = ',';
const NEWLINE: char = '\n';
const CR: char = '\r';
const HYPHEN: char = '-';
const APOSTROPHE: char = '\'';
const AT: char = '@';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("token length is negative: len={len} position={position}")]
    NegativeLength { len: isize, position: usize },
    #[error("inconsistent indices at position {position} in sentence '{sentence}'")]
    BadIndices { position: usize, sentence: String },
    #[error("contraction split expected 'n' or apostrophe after length {len} at position {position}")]
    BadContraction { len: isize, position: usize },
}

/// Tokenizer with its contraction and hyphenation tables.
pub struct PtbTokenizer {
    contractions: Contractions,
    hyphenated: Hyphenated,
}

impl Default for PtbTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PtbTokenizer {
    pub fn new() -> Self {
        PtbTokenizer {
            contractions: Contractions::new(),
            hyphenated: Hyphenated::new(),
        }
    }

    /// Attach tokens to `sent`. Tokens are appended in order of appearance.
    pub fn tokenize(&self, sent: &mut Sentence) -> Result<(), TokenizeError> {
        tokenize_sentence(sent, &self.contractions, &self.hyphenated)
    }
}

pub(crate) fn is_space(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

pub(crate) fn find_next_non_alphanumeric(runes: &[char], from: usize) -> usize {
    for (offset, ch) in runes.iter().enumerate().skip(from) {
        if !(ch.is_alphabetic() || ch.is_numeric()) {
            return offset;
        }
    }
    runes.len()
}

struct TokenFlags {
    word: bool,
    number: bool,
    symbol: bool,
    newline: bool,
    punct: bool,
}

impl TokenFlags {
    fn none() -> Self {
        TokenFlags {
            word: false,
            number: false,
            symbol: false,
            newline: false,
            punct: false,
        }
    }
}

fn push_token(sent: &mut Sentence, orig: &[char], position: usize, len: usize, flags: &TokenFlags) {
    let text: String = orig[position..(position + len).min(orig.len())].iter().collect();
    let begin = position as i32 + sent.span.begin;
    let end = begin + len as i32;
    let mut token = Token::new(Span::new(begin, end, intern(&text)));
    token.is_word = flags.word;
    token.is_number = flags.number;
    token.is_symbol = flags.symbol;
    token.is_newline = flags.newline;
    token.is_punct = flags.punct;
    token.shape = shape_of(&text);
    sent.tokens.push(token);
}

fn tokenize_sentence(
    sent: &mut Sentence,
    contractions: &Contractions,
    hyphenated: &Hyphenated,
) -> Result<(), TokenizeError> {
    if sent.span.text.is_empty() {
        return Ok(());
    }

    let orig: Vec<char> = sent.span.text.chars().collect();
    // Per-rune lowercase keeps the arrays aligned one to one.
    let runes: Vec<char> = orig
        .iter()
        .map(|ch| ch.to_lowercase().next().unwrap_or(*ch))
        .collect();
    let runes_len = runes.len();

    let mut current = match find_first_char_of_next_token(0, &runes) {
        Some(position) => position,
        None => return Ok(()),
    };

    loop {
        let mut flags = TokenFlags::none();
        let first = runes[current];
        let mut token_len: isize = NOT_SET;

        if current + 1 >= runes_len {
            // A token starting at the last rune is always a single symbol.
            token_len = 1;
            flags.symbol = true;
        } else {
            let next = runes[current + 1];
            if is_space(next) {
                token_len = 1;
                flags.punct = is_punct_rune(first);
                flags.word = first.is_alphabetic();
                flags.number = first.is_numeric();
                flags.newline = first == NEWLINE || first == CR;
                flags.symbol = !flags.punct && !flags.word && !flags.number && !flags.newline;
            } else if first == NEWLINE {
                token_len = 1;
                flags.newline = true;
            } else if first == CR {
                token_len = if next == NEWLINE { 2 } else { 1 };
                flags.newline = true;
            } else if first == PERIOD {
                let len = length_if_number_starting_with_period(current, &runes);
                if len > 0 {
                    token_len = len;
                    flags.number = true;
                } else if is_ellipsis(current, &runes) {
                    token_len = 3;
                    flags.punct = true;
                } else {
                    token_len = 1;
                    flags.punct = true;
                }
            } else if first == HYPHEN {
                token_len = 1;
                flags.punct = true;
            } else if first == APOSTROPHE {
                if contractions.starts_with_apostrophe(current, &runes) {
                    token_len = 2;
                    flags.word = true;
                } else {
                    token_len = 1;
                    flags.punct = true;
                }
            } else if is_punct_rune(first) {
                token_len = 1;
                flags.punct = true;
            } else if first.is_alphabetic() || first.is_numeric() {
                let scan = scan_word(current, &runes);

                if scan.obviously_number {
                    token_len = (scan.next_whitespace - current) as isize;
                    flags.number = true;
                } else if scan.obviously_word {
                    let sub = &runes[current..scan.next_whitespace];
                    let first_len = contractions.first_token_len(sub);
                    if first_len > 0 {
                        // Known multi-token word: emit the pieces here.
                        flags.word = true;
                        push_token(sent, &orig, current, first_len as usize, &flags);
                        current += first_len as usize;

                        token_len = contractions.second_token_len(sub);

                        let third_len = contractions.third_token_len(sub);
                        if third_len > 0 {
                            push_token(sent, &orig, current, token_len as usize, &flags);
                            current += token_len as usize;
                            token_len = third_len;
                        }
                    } else {
                        token_len = (scan.next_whitespace - current) as isize;
                        flags.word = true;
                    }
                } else {
                    if scan.next_non_letter_digit < runes_len
                        && runes[scan.next_non_letter_digit] == APOSTROPHE
                    {
                        let sub = &runes[current..scan.next_whitespace];
                        let len = contractions.single_quote_word_len(sub, hyphenated);
                        if len > (scan.next_non_letter_digit - current) as isize {
                            token_len = len;
                            let (number, word) = word_or_number(&runes, current, token_len as usize);
                            flags.number = number;
                            flags.word = word;
                        }
                    }

                    if token_len == NOT_SET {
                        if let Some(split) = contractions.middle_of_contraction(
                            current,
                            scan.next_non_letter_digit,
                            &runes,
                        ) {
                            let word_len = split.word_token_len;
                            if word_len < 0 {
                                return Err(TokenizeError::BadContraction {
                                    len: word_len,
                                    position: current,
                                });
                            }
                            flags.word = true;
                            let after = runes[current + word_len as usize];
                            if after == 'n' || after == APOSTROPHE {
                                if word_len > 0 {
                                    push_token(sent, &orig, current, word_len as usize, &flags);
                                    current += word_len as usize;
                                }
                                token_len = split.contraction_token_len;
                                flags.word = true;
                            } else {
                                return Err(TokenizeError::BadContraction {
                                    len: word_len,
                                    position: current,
                                });
                            }
                        } else if let Some(len) =
                            telephone_number_len(current, &runes, scan.next_non_telephone)
                        {
                            token_len = len as isize;
                            flags.word = true;
                        } else if let Some(len) =
                            postal_code_len(current, &runes, scan.next_non_telephone)
                        {
                            token_len = len as isize;
                            flags.word = true;
                        } else if let Some(len) = url_len(current, &runes, scan.next_whitespace) {
                            token_len = len as isize;
                            flags.word = true;
                        } else if let Some(len) = email_len(current, &runes, scan.next_whitespace) {
                            token_len = len as isize;
                            flags.word = true;
                        } else if let Some(len) =
                            abbreviation_len(current, &runes, scan.next_whitespace)
                        {
                            token_len = len as isize;
                            flags.word = true;
                        } else if scan.next_non_letter_digit < runes_len
                            && runes[scan.next_non_letter_digit] == HYPHEN
                        {
                            let sub = &runes[current..scan.next_whitespace];
                            let len = hyphenated.hyphenated_term_len(sub);
                            if len < 0 {
                                return Err(TokenizeError::NegativeLength {
                                    len,
                                    position: current,
                                });
                            }
                            token_len = len;
                            let (number, word) = word_or_number(&runes, current, token_len as usize);
                            flags.number = number;
                            flags.word = word;
                        } else if scan.next_non_numeric > 0 {
                            if let Some(len) =
                                comma_number_len(current, &runes, scan.next_non_numeric)
                            {
                                token_len = len as isize;
                                flags.number = true;
                            }
                        }

                        if token_len == NOT_SET {
                            if scan.next_non_letter_digit_apostrophe < runes_len
                                && runes[scan.next_non_letter_digit_apostrophe] == PERIOD
                            {
                                if scan.next_non_digit == runes_len - 1 {
                                    token_len = (scan.next_non_digit - current) as isize;
                                    flags.number = true;
                                } else if scan.next_non_letter_digit_apostrophe == scan.next_non_digit {
                                    let tail = len_to_next_non_digit(&runes, scan.next_non_digit + 1);
                                    token_len =
                                        (scan.next_non_digit + 1 + tail - current) as isize;
                                    flags.number = true;
                                } else {
                                    token_len = (scan.next_non_letter_digit - current) as isize;
                                    let (number, word) =
                                        word_or_number(&runes, current, token_len as usize);
                                    flags.number = number;
                                    flags.word = word;
                                }
                            } else {
                                token_len = (scan.next_non_letter_digit - current) as isize;
                                let (number, word) =
                                    word_or_number(&runes, current, token_len as usize);
                                flags.number = number;
                                flags.word = word;
                            }
                        }
                    }
                }
            } else {
                token_len = 1;
                flags.symbol = true;
            }
        }

        if token_len < 0 {
            return Err(TokenizeError::NegativeLength {
                len: token_len,
                position: current,
            });
        }

        if token_len > 0 {
            if current >= orig.len() {
                return Err(TokenizeError::BadIndices {
                    position: current,
                    sentence: sent.span.text.to_string(),
                });
            }
            push_token(sent, &orig, current, token_len as usize, &flags);
        }
        current += token_len as usize;
        match find_first_char_of_next_token(current, &runes) {
            Some(position) => current = position,
            None => break,
        }
    }

    Ok(())
}

/// Unicode punctuation (category P) over the repertoire clinical notes use.
/// ASCII symbols such as `$ + < = > ^ | ~` are deliberately not punctuation.
fn is_punct_rune(ch: char) -> bool {
    matches!(
        ch,
        '!' | '"'
            | '#'
            | '%'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | ','
            | '-'
            | '.'
            | '/'
            | ':'
            | ';'
            | '?'
            | '@'
            | '['
            | '\\'
            | ']'
            | '_'
            | '{'
            | '}'
    ) || matches!(
        ch,
        '«' | '»' | '„' | '“' | '”' | '‘' | '’' | '—' | '–' | '…' | '¿' | '¡' | '§' | '¶' | '·'
    )
}

fn find_first_char_of_next_token(start: usize, runes: &[char]) -> Option<usize> {
    for (position, ch) in runes.iter().enumerate().skip(start) {
        if !is_space(*ch) {
            return Some(position);
        }
        if *ch == NEWLINE || *ch == CR {
            return Some(position);
        }
    }
    None
}

struct WordScan {
    obviously_word: bool,
    obviously_number: bool,
    next_whitespace: usize,
    next_non_letter_digit: usize,
    next_non_letter_digit_apostrophe: usize,
    next_non_telephone: usize,
    next_non_numeric: usize,
    next_non_digit: usize,
}

fn scan_word(current: usize, runes: &[char]) -> WordScan {
    let runes_len = runes.len();
    let mut scan = WordScan {
        obviously_word: true,
        obviously_number: true,
        next_whitespace: usize::MAX,
        next_non_letter_digit: usize::MAX,
        next_non_letter_digit_apostrophe: usize::MAX,
        next_non_telephone: usize::MAX,
        next_non_numeric: usize::MAX,
        next_non_digit: usize::MAX,
    };

    let mut i = current;
    while i < runes_len {
        let ch = runes[i];
        if is_space(ch) {
            scan.next_non_letter_digit = scan.next_non_letter_digit.min(i);
            scan.next_non_letter_digit_apostrophe = scan.next_non_letter_digit_apostrophe.min(i);
            scan.next_non_digit = scan.next_non_digit.min(i);
            scan.next_non_telephone = scan.next_non_telephone.min(i);
            scan.next_non_numeric = scan.next_non_numeric.min(i);
            scan.next_whitespace = i;
            break;
        }

        let letter = ch.is_alphabetic();
        let digit = ch.is_numeric();
        if !(letter || digit) {
            scan.obviously_word = false;
            scan.obviously_number = false;
            scan.next_non_letter_digit = scan.next_non_letter_digit.min(i);
            if ch != APOSTROPHE {
                scan.next_non_letter_digit_apostrophe =
                    scan.next_non_letter_digit_apostrophe.min(i);
            }
            scan.next_non_digit = scan.next_non_digit.min(i);
            if !is_telephone_char(ch) {
                scan.next_non_telephone = scan.next_non_telephone.min(i);
            }
            if !is_numeric_char(ch) {
                scan.next_non_numeric = scan.next_non_numeric.min(i);
            }
        } else if !digit {
            scan.obviously_number = false;
            scan.next_non_digit = scan.next_non_digit.min(i);
            if !is_telephone_char(ch) {
                scan.next_non_telephone = scan.next_non_telephone.min(i);
            }
            if !is_numeric_char(ch) {
                scan.next_non_numeric = scan.next_non_numeric.min(i);
            }
        }
        i += 1;
    }

    if scan.next_whitespace == usize::MAX {
        scan.next_whitespace = runes_len;
    }
    if scan.next_non_letter_digit == usize::MAX {
        scan.next_non_letter_digit = runes_len;
    }
    if scan.next_non_letter_digit_apostrophe == usize::MAX {
        scan.next_non_letter_digit_apostrophe = runes_len;
    }
    if scan.next_non_telephone == usize::MAX {
        scan.next_non_telephone = runes_len;
    }
    if scan.next_non_numeric == usize::MAX {
        scan.next_non_numeric = runes_len;
    }
    if scan.next_non_digit == usize::MAX {
        scan.next_non_digit = runes_len;
    }
    scan
}

fn is_telephone_char(ch: char) -> bool {
    ch.is_numeric() || ch == '-'
}

fn is_numeric_char(ch: char) -> bool {
    ch.is_numeric() || ch == ',' || ch == '.'
}

fn length_if_number_starting_with_period(current: usize, runes: &[char]) -> isize {
    let remaining = runes.len() - current;
    if remaining < 2 {
        return -1;
    }
    if !runes[current + 1].is_numeric() {
        return -1;
    }
    let mut index = current + 2;
    while index < current + remaining {
        if !runes[index].is_numeric() {
            return (index - current) as isize;
        }
        index += 1;
    }
    remaining as isize
}

fn is_ellipsis(position: usize, runes: &[char]) -> bool {
    runes.len() >= position + 3 && runes[position..position + 3] == ['.', '.', '.']
}

fn matches_template(s: &[char], template: &str) -> bool {
    if s.len() != template.len() {
        return false;
    }
    s.iter().zip(template.chars()).all(|(ch, pattern)| match pattern {
        'd' => ch.is_numeric(),
        _ => *ch == pattern,
    })
}

fn telephone_number_len(current: usize, runes: &[char], next_non_telephone: usize) -> Option<usize> {
    if next_non_telephone <= current {
        return None;
    }
    let s = &runes[current..next_non_telephone];
    // Extension 4-5555, local 555-1212, area 507-555-1212 (or 02-2348-2192),
    // country 1-507-555-1212.
    let templates: &[&str] = match s.len() {
        6 => &["d-dddd"],
        8 => &["ddd-dddd"],
        12 => &["ddd-ddd-dddd", "dd-dddd-dddd"],
        14 => &["d-ddd-ddd-dddd"],
        _ => return None,
    };
    templates
        .iter()
        .any(|template| matches_template(s, template))
        .then_some(s.len())
}

fn postal_code_len(current: usize, runes: &[char], next_non_postal: usize) -> Option<usize> {
    if next_non_postal <= current {
        return None;
    }
    let s = &runes[current..next_non_postal];
    matches_template(s, "ddddd-dddd").then_some(s.len())
}

const URL_STARTERS: [&str; 4] = ["http://", "https://", "ftp://", "mailto:"];

fn url_len(current: usize, runes: &[char], end: usize) -> Option<usize> {
    let potential: String = runes[current..end].iter().collect();
    for starter in URL_STARTERS {
        if potential.starts_with(starter) && potential.len() > starter.len() {
            return Some(end - current);
        }
    }
    None
}

const VALID_EMAIL_EXTRAS: &str = "!#$%&'*+/=?^_`{|}~-";
const MAX_LOCAL_PART: usize = 64;
const MAX_EMAIL_LEN: usize = 320;

fn email_len(current: usize, runes: &[char], end: usize) -> Option<usize> {
    let at_index = runes[current..end].iter().position(|ch| *ch == AT)?;
    if at_index < 1 || current + at_index + 1 == end || at_index > MAX_LOCAL_PART {
        return None;
    }

    for i in current..current + at_index {
        let ch = runes[i];
        if ch == PERIOD {
            // Dots are fine inside the local part but not at its edges.
            if i == current || i == current + at_index - 1 {
                return None;
            }
        } else if !(ch.is_alphabetic() || ch.is_numeric()) && !VALID_EMAIL_EXTRAS.contains(ch) {
            return None;
        }
    }

    let mut prev = AT;
    for i in current + at_index + 1..end {
        let ch = runes[i];
        if ch.is_alphabetic() || ch.is_numeric() {
            // fine
        } else if ch == HYPHEN || ch == PERIOD {
            if i + 1 < end && (runes[i + 1].is_alphabetic() || runes[i + 1].is_numeric()) {
                // dotted/hyphenated domain part continues
            } else if prev.is_alphabetic() || prev.is_numeric() {
                return Some(i - current - 1);
            } else {
                return None;
            }
        } else if prev.is_alphabetic() || prev.is_numeric() {
            return Some(i - current - 1);
        } else {
            return None;
        }
        prev = ch;
    }

    let len = end - current;
    (len <= MAX_EMAIL_LEN).then_some(len)
}

fn abbreviation_len(current: usize, runes: &[char], end: usize) -> Option<usize> {
    if end - current >= 4 && runes[current..current + 4] == ['w', 'w', 'w', '.'] {
        return None;
    }

    let mut contains_letter = false;
    for i in current..end {
        let ch = runes[i];
        let peek_ahead = if i + 1 < end { runes[i + 1] } else { ' ' };

        if ch.is_alphabetic() {
            contains_letter = true;
        } else if ch != PERIOD {
            return None;
        } else if !contains_letter || i + 1 == runes.len() {
            return None;
        } else {
            let so_far = i + 1 - current;
            if let Some(tail) = abbreviation_len(i + 1, runes, end) {
                return Some(so_far + tail);
            }
            if is_space(peek_ahead) || is_final_punctuation(peek_ahead) {
                return Some(so_far);
            } else if !(peek_ahead.is_alphabetic() || peek_ahead.is_numeric()) {
                return (so_far > 1).then_some(so_far - 1);
            }
            return None;
        }
    }
    None
}

fn is_final_punctuation(ch: char) -> bool {
    matches!(ch, '?' | '!' | ':')
}

fn word_or_number(runes: &[char], current: usize, len: usize) -> (bool, bool) {
    for ch in &runes[current..(current + len).min(runes.len())] {
        if ch.is_alphabetic() {
            return (false, true);
        }
    }
    (true, false)
}

fn comma_number_len(current: usize, runes: &[char], next_non_numeric: usize) -> Option<usize> {
    let s = &runes[..next_non_numeric.min(runes.len())];

    let comma_position = s.iter().skip(current).position(|ch| *ch == COMMA)? + current;
    if comma_position == 0 {
        return None;
    }

    let period_position = s.iter().skip(current).position(|ch| *ch == PERIOD).map(|p| p + current);
    let end_of_whole = period_position.unwrap_or(s.len());
    if comma_position > end_of_whole {
        return None;
    }

    let mut len: isize = -1;
    let mut position = comma_position;
    let mut broke = false;
    while !broke {
        len = (position - current) as isize;
        if position < end_of_whole && s[position] == COMMA {
            position += 1;
        }
        for _ in 0..3 {
            if position < end_of_whole && s[position].is_numeric() {
                position += 1;
            } else {
                broke = true;
            }
        }
        if position < end_of_whole && s[position].is_numeric() {
            broke = true;
        }
    }

    if len <= 0 {
        return None;
    }
    let mut len = len as usize;

    if let Some(period_position) = period_position {
        if period_position != runes.len() - 1 && period_position == current + len {
            len += 1;
            while current + len < next_non_numeric && s.get(current + len).map(|c| c.is_numeric()).unwrap_or(false)
            {
                len += 1;
            }
        }
    }

    Some(len)
}

fn len_to_next_non_digit(runes: &[char], start: usize) -> usize {
    for (i, ch) in runes.iter().enumerate().skip(start) {
        if !ch.is_numeric() {
            return i - start;
        }
    }
    runes.len().saturating_sub(start)
}

#[cfg(test)]
mod tests;
