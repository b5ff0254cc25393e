//! Surface-form normalization applied before any table lookup.

use once_cell::sync::Lazy;
use regex::Regex;

pub const URL_RESULT: &str = "#url#";

static DIGIT_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d%|\$\d|(^|\d)\.\d|\d,\d|\d:\d|\d-\d|\d/\d").unwrap());
static DIGIT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static URL_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(([A-Za-z]{3,9}:(?://)?)(?:[-;:&=+$,\w]+@)?[A-Za-z0-9.-]+|(?:www\.|[-;:&=+$,\w]+@)[A-Za-z0-9.-]+)((?:/[+~%/.\w-]*)?\??(?:[-+=&;%@.\w]*)#?(?:[.!/\\\w]*))?|(\w+\.)+(com|edu|gov|int|mil|net|org|biz)$",
    )
    .unwrap()
});
static PUNCT_REPEAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}|!{2,}|\?{2,}|-{2,}|\*{2,}|={2,}|~{2,}|,{2,}").unwrap());

/// Regex-driven basic normalizer: URL collapse, digit collapse, punctuation
/// run truncation.
#[derive(Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Normalizer
    }

    pub fn normalize_basic(&self, form: &str) -> String {
        if URL_SPAN.is_match(form) {
            return URL_RESULT.to_string();
        }
        let form = self.normalize_digits(form);
        self.normalize_punctuation(&form)
    }

    fn normalize_digits(&self, form: &str) -> String {
        let form = DIGIT_LIKE.replace_all(form, "0");
        DIGIT_SPAN.replace_all(&form, "0").into_owned()
    }

    fn normalize_punctuation(&self, form: &str) -> String {
        PUNCT_REPEAT
            .replace_all(form, |caps: &regex::Captures<'_>| {
                caps[0][..2].to_string()
            })
            .into_owned()
    }
}
