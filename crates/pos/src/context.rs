//! Contextual feature generation for the tagger.

use std::collections::HashSet;

use annot::{istr, Span, Token};

const PREFIX_LENGTH: usize = 4;
const SUFFIX_LENGTH: usize = 4;

/// Generates the context strings for one position in a token sequence.
pub struct ContextGenerator {
    dict: HashSet<String>,
    sb_token: Token,
    se_token: Token,
}

impl Default for ContextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextGenerator {
    pub fn new() -> Self {
        ContextGenerator {
            dict: HashSet::new(),
            sb_token: Token::new(Span::new(0, 0, istr("*SB*"))),
            se_token: Token::new(Span::new(0, 0, istr("*SE*"))),
        }
    }

    pub fn with_dictionary(dict: HashSet<String>) -> Self {
        ContextGenerator {
            dict,
            ..Self::new()
        }
    }

    pub fn context(&self, index: usize, tokens: &[&Token], tags: &[String]) -> Vec<String> {
        let lex = tokens[index].shaped_text();

        let mut next = &self.se_token;
        let mut nextnext: Option<&Token> = None;
        let mut prev = &self.sb_token;
        let mut prevprev: Option<&Token> = None;
        let mut tagprev = "";
        let mut tagprevprev = "";

        if tokens.len() > index + 1 {
            next = tokens[index + 1];
            nextnext = Some(&self.se_token);
            if tokens.len() > index + 2 {
                nextnext = Some(tokens[index + 2]);
            }
        }

        if index > 0 {
            prev = tokens[index - 1];
            prevprev = Some(&self.sb_token);
            tagprev = &tags[index - 1];
            if index >= 2 {
                prevprev = Some(tokens[index - 2]);
                tagprevprev = &tags[index - 2];
            }
        }

        let mut contexts = vec!["default".to_string(), format!("w={lex}")];

        if !self.dict.contains(&lex) {
            for suffix in suffixes(&lex) {
                contexts.push(format!("suf={suffix}"));
            }
            for prefix in prefixes(&lex) {
                contexts.push(format!("pre={prefix}"));
            }
            if lex.contains('-') {
                contexts.push("h".to_string());
            }
            if tokens[index].shape.contains('X') {
                contexts.push("c".to_string());
            }
            if tokens[index].shape.contains('d') {
                contexts.push("d".to_string());
            }
        }

        contexts.push(format!("p={}", prev.shaped_text()));
        if !tagprev.is_empty() {
            contexts.push(format!("t={tagprev}"));
        }
        if let Some(prevprev) = prevprev {
            contexts.push(format!("pp={}", prevprev.shaped_text()));
            if !tagprevprev.is_empty() {
                contexts.push(format!("t2={tagprevprev},{tagprev}"));
            }
        }

        contexts.push(format!("n={}", next.shaped_text()));
        if let Some(nextnext) = nextnext {
            contexts.push(format!("nn={}", nextnext.shaped_text()));
        }

        contexts
    }
}

fn prefixes(lex: &str) -> Vec<String> {
    let runes: Vec<char> = lex.chars().collect();
    (0..PREFIX_LENGTH)
        .map(|li| runes[..runes.len().min(li + 1)].iter().collect())
        .collect()
}

fn suffixes(lex: &str) -> Vec<String> {
    let runes: Vec<char> = lex.chars().collect();
    (0..SUFFIX_LENGTH)
        .map(|li| {
            let start = runes.len().saturating_sub(li + 1);
            runes[start..].iter().collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, begin: i32) -> Token {
        let end = begin + text.chars().count() as i32;
        let mut token = Token::new(Span::new(begin, end, istr(text)));
        token.is_word = true;
        token
    }

    #[test]
    fn context_includes_window_and_affixes() {
        let tokens = [word("the", 0), word("patient", 4), word("walks", 12)];
        let refs: Vec<&Token> = tokens.iter().collect();
        let generator = ContextGenerator::new();

        let ctx = generator.context(1, &refs, &["DT".to_string()]);
        assert!(ctx.contains(&"default".to_string()));
        assert!(ctx.contains(&"w=patient".to_string()));
        assert!(ctx.contains(&"suf=t".to_string()));
        assert!(ctx.contains(&"suf=ient".to_string()));
        assert!(ctx.contains(&"pre=p".to_string()));
        assert!(ctx.contains(&"pre=pati".to_string()));
        assert!(ctx.contains(&"p=the".to_string()));
        assert!(ctx.contains(&"t=DT".to_string()));
        assert!(ctx.contains(&"pp=*SB*".to_string()));
        assert!(ctx.contains(&"n=walks".to_string()));
        assert!(ctx.contains(&"nn=*SE*".to_string()));
    }

    #[test]
    fn sequence_edges_use_boundary_tokens() {
        let tokens = [word("one", 0)];
        let refs: Vec<&Token> = tokens.iter().collect();
        let ctx = ContextGenerator::new().context(0, &refs, &[]);
        assert!(ctx.contains(&"p=*SB*".to_string()));
        assert!(ctx.contains(&"n=*SE*".to_string()));
        assert!(!ctx.iter().any(|c| c.starts_with("pp=")));
        assert!(!ctx.iter().any(|c| c.starts_with("nn=")));
    }

    #[test]
    fn shape_hints_fire_for_caps_and_digits() {
        let tokens = [word("Mg2", 0)];
        let refs: Vec<&Token> = tokens.iter().collect();
        let mut shaped = tokens[0].clone();
        shaped.shape = "Xxd".into();
        let shaped_refs: Vec<&Token> = vec![&shaped];

        let ctx = ContextGenerator::new().context(0, &shaped_refs, &[]);
        assert!(ctx.contains(&"c".to_string()));
        assert!(ctx.contains(&"d".to_string()));
        let _ = refs;
    }

    #[test]
    fn dictionary_words_skip_affix_features() {
        let tokens = [word("aspirin", 0)];
        let refs: Vec<&Token> = tokens.iter().collect();
        let dict: HashSet<String> = ["aspirin".to_string()].into_iter().collect();
        let ctx = ContextGenerator::with_dictionary(dict).context(0, &refs, &[]);
        assert!(!ctx.iter().any(|c| c.starts_with("suf=")));
        assert!(!ctx.iter().any(|c| c.starts_with("pre=")));
    }
}
