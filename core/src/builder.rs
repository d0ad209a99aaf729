use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::index::{DocId, InvertedIndex, Posting};
use crate::tokenizer::document_terms;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Word counts of a single document, computed without touching shared state.
#[derive(Debug)]
struct DocumentCounts {
    doc_id: DocId,
    counts: HashMap<String, u32>,
    truncated: Option<(usize, usize)>, // (words, kept)
}

fn count_document(doc_id: DocId, text: &str) -> DocumentCounts {
    let terms = document_terms(text);
    let truncated = terms.is_truncated().then(|| (terms.total, terms.len()));
    let mut counts: HashMap<String, u32> = HashMap::new();
    for word in terms.words {
        *counts.entry(word).or_insert(0) += 1;
    }
    DocumentCounts { doc_id, counts, truncated }
}

/// Builds an [`InvertedIndex`] from an ordered document collection.
///
/// Documents are counted independently on a bounded rayon pool, then merged
/// on the calling thread and every posting list is sorted by `doc_id`. The
/// result does not depend on the thread count or on scheduling.
#[derive(Clone)]
pub struct IndexBuilder {
    threads: Option<usize>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for IndexBuilder {
    fn default() -> Self { Self { threads: None, sink: Arc::new(TracingSink) } }
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Count documents on a dedicated pool of `threads` workers instead of the
    /// global rayon pool (sized to the available parallelism).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build<S: AsRef<str> + Sync>(&self, documents: &[S]) -> InvertedIndex {
        self.build_with(documents, count_document)
    }

    fn build_with<S, F>(&self, documents: &[S], count: F) -> InvertedIndex
    where
        S: AsRef<str> + Sync,
        F: Fn(DocId, &str) -> DocumentCounts + Sync,
    {
        if documents.is_empty() {
            return InvertedIndex::new();
        }

        let per_document = self.count_all(documents, &count);

        for doc in &per_document {
            if let Some((words, kept)) = doc.truncated {
                self.sink.report(Diagnostic::DocumentTruncated { doc_id: doc.doc_id, words, kept });
            }
        }

        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        for doc in per_document {
            for (word, count) in doc.counts {
                postings.entry(word).or_default().push(Posting { doc_id: doc.doc_id, count });
            }
        }
        for list in postings.values_mut() {
            list.sort_unstable_by_key(|p| p.doc_id);
            debug_assert!(list.windows(2).all(|w| w[0].doc_id < w[1].doc_id));
        }

        let index = InvertedIndex { postings, num_docs: documents.len() as u32 };
        tracing::debug!(num_docs = index.num_docs(), num_words = index.num_words(), "index built");
        index
    }

    fn count_all<S, F>(&self, documents: &[S], count: &F) -> Vec<DocumentCounts>
    where
        S: AsRef<str> + Sync,
        F: Fn(DocId, &str) -> DocumentCounts + Sync,
    {
        let run = || -> Vec<DocumentCounts> {
            documents
                .par_iter()
                .enumerate()
                .map(|(i, doc)| count(i as DocId, doc.as_ref()))
                .collect()
        };
        match self.threads {
            None => run(),
            Some(threads) => match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("docsearch_index_{i}"))
                .build()
            {
                Ok(pool) => pool.install(run),
                Err(err) => {
                    tracing::warn!(threads, error = %err, "cannot create index pool, using the global pool");
                    run()
                }
            },
        }
    }
}
