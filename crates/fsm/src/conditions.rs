//! Condition constructors shared by every FSM family.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use annot::{HasSpan, Token};

/// View of an FSM input token: a span plus the raw-token classification
/// flags. Domain token enums (raw token or prior FSM output) implement this;
/// output variants report `false` for the raw flags so conditions that only
/// apply to raw tokens stay inert on them.
pub trait TokenView: HasSpan {
    fn text(&self) -> &str {
        &self.span().text
    }
    fn is_word(&self) -> bool {
        false
    }
    fn is_number(&self) -> bool {
        false
    }
    fn is_punct(&self) -> bool {
        false
    }
    fn is_newline(&self) -> bool {
        false
    }
    /// Whether this is a raw tokenizer token (as opposed to a prior FSM's
    /// output span).
    fn is_raw_token(&self) -> bool {
        false
    }
}

impl TokenView for Token {
    fn is_word(&self) -> bool {
        self.is_word
    }
    fn is_number(&self) -> bool {
        self.is_number
    }
    fn is_punct(&self) -> bool {
        self.is_punct
    }
    fn is_newline(&self) -> bool {
        self.is_newline
    }
    fn is_raw_token(&self) -> bool {
        true
    }
}

/// A transition condition.
pub type Cond<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Always true; the universal trailing rule.
pub fn any<T>() -> Cond<T> {
    Arc::new(|_| true)
}

/// Raw number token.
pub fn number<T: TokenView>() -> Cond<T> {
    Arc::new(|t| t.is_number())
}

/// Single-rune punctuation token equal to `ch`.
pub fn punct_value<T: TokenView>(ch: char) -> Cond<T> {
    Arc::new(move |t| {
        t.is_punct() && {
            let mut chars = t.text().chars();
            chars.next() == Some(ch) && chars.next().is_none()
        }
    })
}

/// Token text is a member of `set`.
pub fn word_set<T: TokenView>(set: Arc<HashSet<String>>) -> Cond<T> {
    Arc::new(move |t| set.contains(t.text()))
}

/// Token text is a key of `map`.
pub fn word_map<T: TokenView, V: Send + Sync + 'static>(map: Arc<HashMap<String, V>>) -> Cond<T> {
    Arc::new(move |t| map.contains_key(t.text()))
}

/// Raw token whose text, after stripping a leading digit run and an optional
/// `-`, is a member of `set`. Matches forms like `25mg` or `2-tablet`.
pub fn contains_set<T: TokenView>(set: Arc<HashSet<String>>) -> Cond<T> {
    Arc::new(move |t| {
        if !t.is_raw_token() {
            return false;
        }
        let text = t.text();
        let mut rest = "";
        let mut saw_digit = false;
        for (pos, ch) in text.char_indices() {
            if ch.is_ascii_digit() {
                saw_digit = true;
                rest = &text[pos + ch.len_utf8()..];
            } else {
                if !saw_digit {
                    return false;
                }
                break;
            }
        }
        let rest = rest.strip_prefix('-').filter(|_| rest.len() > 1).unwrap_or(rest);
        set.contains(rest)
    })
}

/// Word token equal to `value`, case-insensitive.
pub fn text_value<T: TokenView>(value: &'static str) -> Cond<T> {
    Arc::new(move |t| t.is_word() && t.text().len() == value.len() && t.text().eq_ignore_ascii_case(value))
}

/// Token text parses as exactly `n`.
pub fn integer_value<T: TokenView>(n: i64) -> Cond<T> {
    Arc::new(move |t| t.text().parse::<i64>().map(|num| num == n).unwrap_or(false))
}

/// Token text parses into `[low, high]`.
pub fn integer_range<T: TokenView>(low: i64, high: i64) -> Cond<T> {
    Arc::new(move |t| {
        t.text()
            .parse::<i64>()
            .map(|num| num >= low && num <= high)
            .unwrap_or(false)
    })
}

/// Inverts `cond`.
pub fn negate<T: 'static>(cond: Cond<T>) -> Cond<T> {
    Arc::new(move |t| !cond(t))
}

/// Any of `conds`.
pub fn disjoint<T: 'static>(conds: Vec<Cond<T>>) -> Cond<T> {
    Arc::new(move |t| conds.iter().any(|cond| cond(t)))
}

/// All of `conds`.
pub fn combine<T: 'static>(conds: Vec<Cond<T>>) -> Cond<T> {
    Arc::new(move |t| conds.iter().all(|cond| cond(t)))
}

/// Raw token of the shape `H;M` with both parts in range. The `;` separator
/// mirrors the original rule set verbatim.
pub fn hour_minute<T: TokenView>(min_hour: i64, max_hour: i64, min_minute: i64, max_minute: i64) -> Cond<T> {
    Arc::new(move |t| {
        if !t.is_raw_token() {
            return false;
        }
        let text = t.text();
        let Some(idx) = text.find(';') else {
            return false;
        };
        let (Ok(hour), Ok(minute)) = (text[..idx].parse::<i64>(), text[idx + 1..].parse::<i64>()) else {
            return false;
        };
        hour >= min_hour && hour <= max_hour && minute >= min_minute && minute <= max_minute
    })
}

/// 3–4 rune raw token starting with `a.m` or `p.m`.
pub fn day_night_word<T: TokenView>() -> Cond<T> {
    Arc::new(|t| {
        if !t.is_raw_token() {
            return false;
        }
        let len = t.span().end - t.span().begin;
        (3..=4).contains(&len) && (t.text().starts_with("p.m") || t.text().starts_with("a.m"))
    })
}

/// A shareable word-set from string literals.
pub fn set_of(words: &[&str]) -> Arc<HashSet<String>> {
    Arc::new(words.iter().map(|w| w.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot::{istr, Span};

    fn token(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        Token::new(Span::new(begin, end, istr(text)))
    }

    fn word(text: &str, begin: i32) -> Token {
        let mut t = token(text, begin);
        t.is_word = true;
        t
    }

    fn punct(text: &str, begin: i32) -> Token {
        let mut t = token(text, begin);
        t.is_punct = true;
        t
    }

    #[test]
    fn punct_value_needs_single_rune() {
        let cond = punct_value::<Token>('/');
        assert!(cond(&punct("/", 0)));
        assert!(!cond(&punct("//", 0)));
        assert!(!cond(&word("/", 0)));
    }

    #[test]
    fn contains_set_strips_numeric_prefix_and_dash() {
        let cond = contains_set::<Token>(set_of(&["mg", "tablet"]));
        let mut t = token("25mg", 0);
        t.is_word = true;
        assert!(cond(&t));
        let t2 = token("2-tablet", 0);
        assert!(cond(&t2));
        assert!(!cond(&token("mg", 0)));
        assert!(!cond(&token("25kg", 0)));
    }

    #[test]
    fn text_value_is_case_insensitive_word_match() {
        let cond = text_value::<Token>("of");
        assert!(cond(&word("of", 0)));
        assert!(!cond(&word("off", 0)));
        assert!(!cond(&punct("of", 0)));
    }

    #[test]
    fn integer_conditions_parse_text() {
        assert!(integer_value::<Token>(8)(&token("8", 0)));
        assert!(!integer_value::<Token>(8)(&token("eight", 0)));
        assert!(integer_range::<Token>(1, 12)(&token("12", 0)));
        assert!(!integer_range::<Token>(1, 12)(&token("13", 0)));
    }

    #[test]
    fn combinators_compose() {
        let not_small = negate(integer_range::<Token>(1, 7));
        let num = number::<Token>();
        let mut eight = token("8", 0);
        eight.is_number = true;
        assert!(combine(vec![not_small.clone(), num.clone()])(&eight));
        let mut five = token("5", 0);
        five.is_number = true;
        assert!(!combine(vec![not_small, num])(&five));
    }

    #[test]
    fn day_night_word_checks_shape() {
        let cond = day_night_word::<Token>();
        assert!(cond(&word("p.m.", 0)));
        assert!(cond(&word("a.m", 0)));
        assert!(!cond(&word("pm", 0)));
    }
}
