//! Conjunctive, ranked retrieval over an [`InvertedIndex`].
//!
//! A document matches a query only when it contains every distinct query word.
//! Matches are scored by the summed word counts, normalized by the best score
//! of the query, ordered by rank then `doc_id`, and cut to the response limit.

use crate::builder::IndexBuilder;
use crate::config::{DEFAULT_RESPONSES_LIMIT, MAX_REQUESTS};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::index::{DocId, InvertedIndex, Posting};
use crate::tokenizer::query_terms;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceResult {
    pub doc_id: DocId,
    pub rank: f32, // relative to the best match of the query, in [0, 1]
}

/// Two-pointer intersection of two ascending id lists.
fn intersect(docs: &[DocId], postings: &[Posting]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(docs.len().min(postings.len()));
    let (mut i, mut j) = (0, 0);
    while i < docs.len() && j < postings.len() {
        match docs[i].cmp(&postings[j].doc_id) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(docs[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Add each posting's count to the score of the matching id in `docs`.
/// `scores` is parallel to `docs`; postings outside `docs` are skipped.
fn accumulate(docs: &[DocId], postings: &[Posting], scores: &mut [u64]) {
    let (mut i, mut j) = (0, 0);
    while i < docs.len() && j < postings.len() {
        match docs[i].cmp(&postings[j].doc_id) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                scores[i] += u64::from(postings[j].count);
                i += 1;
                j += 1;
            }
        }
    }
}

/// Answers queries against a borrowed index.
pub struct SearchServer<'a> {
    index: &'a InvertedIndex,
    responses_limit: usize,
    sink: Arc<dyn DiagnosticSink>,
}

impl<'a> SearchServer<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index, responses_limit: DEFAULT_RESPONSES_LIMIT, sink: Arc::new(TracingSink) }
    }

    /// Maximum results per query. Zero falls back to [`DEFAULT_RESPONSES_LIMIT`].
    pub fn with_responses_limit(mut self, limit: usize) -> Self {
        self.responses_limit = if limit > 0 { limit } else { DEFAULT_RESPONSES_LIMIT };
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn responses_limit(&self) -> usize { self.responses_limit }

    /// One result list per query, in input order. Queries past
    /// [`MAX_REQUESTS`] are left out of the output.
    pub fn search<S: AsRef<str>>(&self, queries: &[S]) -> Vec<Vec<RelevanceResult>> {
        if queries.len() > MAX_REQUESTS {
            self.sink.report(Diagnostic::RequestsTruncated { requests: queries.len(), kept: MAX_REQUESTS });
        }
        queries
            .iter()
            .take(MAX_REQUESTS)
            .enumerate()
            .map(|(i, q)| self.rank(i, q.as_ref()))
            .collect()
    }

    pub fn search_query(&self, query: &str) -> Vec<RelevanceResult> { self.rank(0, query) }

    fn rank(&self, position: usize, query: &str) -> Vec<RelevanceResult> {
        let terms = query_terms(query);
        if terms.is_truncated() {
            self.sink.report(Diagnostic::QueryTruncated { query: position, words: terms.total, kept: terms.len() });
        }
        if terms.is_empty() {
            return Vec::new();
        }

        let mut lists: Vec<&[Posting]> = terms.words.iter().map(|w| self.index.get_word_count(w)).collect();
        if lists.iter().any(|l| l.is_empty()) {
            return Vec::new();
        }
        // rarest first; stable so equal lengths keep query order
        lists.sort_by_key(|l| l.len());

        let mut docs: Vec<DocId> = lists[0].iter().map(|p| p.doc_id).collect();
        for list in &lists[1..] {
            docs = intersect(&docs, list);
            if docs.is_empty() {
                return Vec::new();
            }
        }

        let mut scores = vec![0u64; docs.len()];
        for list in &lists {
            accumulate(&docs, list, &mut scores);
        }

        let mut scored: Vec<(DocId, u64)> = docs.into_iter().zip(scores).collect();
        scored.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(self.responses_limit);

        let max = scored.first().map(|s| s.1).unwrap_or(1).max(1) as f64;
        tracing::trace!(query, matches = scored.len(), "query ranked");
        scored
            .into_iter()
            .map(|(doc_id, score)| RelevanceResult { doc_id, rank: (score as f64 / max) as f32 })
            .collect()
    }
}

/// Owns the current index and answers query batches against it.
///
/// [`SearchEngine::update_document_base`] builds a new index and replaces the
/// shared handle, so snapshots taken with [`SearchEngine::index`] stay valid.
pub struct SearchEngine {
    index: Arc<InvertedIndex>,
    builder: IndexBuilder,
    responses_limit: usize,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            index: Arc::new(InvertedIndex::new()),
            builder: IndexBuilder::new(),
            responses_limit: DEFAULT_RESPONSES_LIMIT,
            sink: Arc::new(TracingSink),
        }
    }
}

impl SearchEngine {
    pub fn new<S: AsRef<str> + Sync>(documents: &[S]) -> Self {
        let mut engine = Self::default();
        engine.update_document_base(documents);
        engine
    }

    pub fn with_responses_limit(mut self, limit: usize) -> Self {
        self.responses_limit = if limit > 0 { limit } else { DEFAULT_RESPONSES_LIMIT };
        self
    }

    /// Diagnostics from later builds and from searches go to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.builder = self.builder.with_sink(sink.clone());
        self.sink = sink;
        self
    }

    /// Later builds count documents on a pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.builder = self.builder.with_threads(threads);
        self
    }

    pub fn update_document_base<S: AsRef<str> + Sync>(&mut self, documents: &[S]) {
        self.index = Arc::new(self.builder.build(documents));
        tracing::info!(num_docs = self.index.num_docs(), num_words = self.index.num_words(), "document base updated");
    }

    pub fn index(&self) -> Arc<InvertedIndex> { Arc::clone(&self.index) }

    pub fn responses_limit(&self) -> usize { self.responses_limit }

    pub fn search<S: AsRef<str>>(&self, queries: &[S]) -> Vec<Vec<RelevanceResult>> {
        SearchServer::new(&self.index)
            .with_responses_limit(self.responses_limit)
            .with_sink(self.sink.clone())
            .search(queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postings(ids: &[DocId]) -> Vec<Posting> {
        ids.iter().map(|&doc_id| Posting { doc_id, count: 1 }).collect()
    }

    #[test]
    fn intersect_sorted_lists() {
        assert_eq!(intersect(&[1, 3, 5, 7], &postings(&[0, 3, 4, 7, 9])), vec![3, 7]);
        assert!(intersect(&[1, 2], &postings(&[3, 4])).is_empty());
        assert!(intersect(&[], &postings(&[3])).is_empty());
    }

    #[test]
    fn accumulate_skips_docs_outside_intersection() {
        let list = vec![
            Posting { doc_id: 0, count: 4 },
            Posting { doc_id: 2, count: 1 },
            Posting { doc_id: 5, count: 3 },
        ];
        let mut scores = vec![0u64; 2];
        accumulate(&[2, 5], &list, &mut scores);
        assert_eq!(scores, vec![1, 3]);
    }

    #[test]
    fn zero_limit_uses_default() {
        let idx = InvertedIndex::new();
        assert_eq!(SearchServer::new(&idx).with_responses_limit(0).responses_limit(), DEFAULT_RESPONSES_LIMIT);
    }

    #[test]
    fn engine_snapshot_survives_update() {
        let mut engine = SearchEngine::new(&["alpha beta"]);
        let before = engine.index();
        engine.update_document_base(&["gamma"]);
        assert_eq!(before.get_word_count("alpha").len(), 1);
        assert!(engine.index().get_word_count("alpha").is_empty());
        assert_eq!(engine.search(&["gamma"]), vec![vec![RelevanceResult { doc_id: 0, rank: 1.0 }]]);
    }
}
