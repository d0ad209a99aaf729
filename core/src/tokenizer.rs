use crate::config::{MAX_DOCUMENT_WORDS, MAX_QUERY_WORDS, MAX_WORD_LEN};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[a-z]+").expect("valid regex");
}

/// Words produced by one of the indexing policies, plus how many survived the
/// length filter before the count cap was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terms {
    pub words: Vec<String>,
    pub total: usize,
}

impl Terms {
    fn capped(mut words: Vec<String>, cap: usize) -> Self {
        let total = words.len();
        words.truncate(cap);
        Self { words, total }
    }

    pub fn is_truncated(&self) -> bool { self.total > self.words.len() }
    pub fn is_empty(&self) -> bool { self.words.is_empty() }
    pub fn len(&self) -> usize { self.words.len() }
}

/// Split text into lowercase ASCII words. Every character other than an ASCII
/// letter acts as a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_ascii_lowercase();
    RE.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

fn within_word_limit(word: &str) -> bool { word.len() <= MAX_WORD_LEN }

/// Words of a document: overlong words dropped, then the first
/// [`MAX_DOCUMENT_WORDS`] kept.
pub fn document_terms(text: &str) -> Terms {
    let words = tokenize(text).into_iter().filter(|w| within_word_limit(w)).collect();
    Terms::capped(words, MAX_DOCUMENT_WORDS)
}

/// Distinct words of a query in order of first appearance: overlong words
/// dropped, duplicates removed, then the first [`MAX_QUERY_WORDS`] kept.
pub fn query_terms(text: &str) -> Terms {
    let mut seen = HashSet::new();
    let words = tokenize(text)
        .into_iter()
        .filter(|w| within_word_limit(w))
        .filter(|w| seen.insert(w.clone()))
        .collect();
    Terms::capped(words, MAX_QUERY_WORDS)
}
