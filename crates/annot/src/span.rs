//! Rune-indexed text spans.

use crate::interner::{istr, IStr};
use crate::sentence::Sentence;

/// A half-open `[begin, end)` range of rune positions in the request text,
/// together with the covered text.
#[derive(Debug, Clone)]
pub struct Span {
    pub begin: i32,
    pub end: i32,
    pub text: IStr,
}

impl Span {
    pub fn new(begin: i32, end: i32, text: IStr) -> Self {
        Span { begin, end, text }
    }

    /// Rune length of the span.
    pub fn len(&self) -> i32 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// Slice this span's text out of its enclosing sentence, in rune space.
    /// Returns `None` when the span is not fully inside the sentence.
    pub fn text_from_sentence(&self, sent: &Sentence) -> Option<String> {
        slice_runes(&sent.span.text, self.begin - sent.span.begin, self.end - sent.span.begin)
    }

    /// Rebuild `text` from the enclosing sentence; no-op when out of range.
    pub fn fill_text_from_sentence(&mut self, sent: &Sentence) -> bool {
        match self.text_from_sentence(sent) {
            Some(txt) => {
                self.text = istr(&txt);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.begin == other.begin && self.end == other.end
    }
}

impl Eq for Span {}

impl std::hash::Hash for Span {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.begin.hash(state);
        self.end.hash(state);
    }
}

/// Anything carrying a [`Span`]. Tokens, sentences, annotations and FSM
/// output tokens all implement this.
pub trait HasSpan {
    fn span(&self) -> &Span;
}

impl HasSpan for Span {
    fn span(&self) -> &Span {
        self
    }
}

/// True when `covering` fully covers `covered`.
pub fn spans_cover(covered: &Span, covering: &Span) -> bool {
    covering.begin <= covered.begin && covering.end >= covered.end
}

/// Order spans by begin, ties by end. Shared by every consumer that re-sorts
/// unordered stage output.
pub fn span_order(a: &Span, b: &Span) -> std::cmp::Ordering {
    a.begin.cmp(&b.begin).then(a.end.cmp(&b.end))
}

/// Index of the first item whose span lies inside `[begin, end)`.
pub fn search_first_in_span<T: HasSpan>(items: &[T], begin: i32, end: i32) -> Option<usize> {
    items
        .iter()
        .position(|item| item.span().begin >= begin && item.span().end <= end)
}

/// Rune-space substring of `text`; `None` when indices fall outside.
pub fn slice_runes(text: &str, begin: i32, end: i32) -> Option<String> {
    if begin < 0 || end < begin {
        return None;
    }
    let (begin, end) = (begin as usize, end as usize);
    let mut out = String::new();
    let mut count = 0usize;
    for ch in text.chars() {
        if count >= end {
            break;
        }
        if count >= begin {
            out.push(ch);
        }
        count += 1;
    }
    if count < end {
        return None;
    }
    Some(out)
}
