use crate::builder::IndexBuilder;
use serde::Serialize;
use std::collections::HashMap;

pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub count: u32, // occurrences of the word in the document
}

/// Word to postings mapping over a fixed document collection.
///
/// Built in one pass by [`IndexBuilder`] and read-only afterwards. Every
/// posting list is strictly ascending by `doc_id`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    pub(crate) postings: HashMap<String, Vec<Posting>>,
    pub(crate) num_docs: u32,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index `documents` with the default builder. Document ids are positions in the slice.
    pub fn build<S: AsRef<str> + Sync>(documents: &[S]) -> Self {
        IndexBuilder::new().build(documents)
    }

    /// Throw away the current contents and index `documents` from scratch.
    pub fn update_document_base<S: AsRef<str> + Sync>(&mut self, documents: &[S]) {
        *self = Self::build(documents);
    }

    /// Postings for `word`, empty when the word was never seen.
    pub fn get_word_count(&self, word: &str) -> &[Posting] {
        self.postings.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }
    pub fn num_words(&self) -> usize { self.postings.len() }
    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    /// Indexed words in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.keys().map(String::as_str)
    }
}
