//! Non-fatal events raised while indexing and searching.
//!
//! Oversized documents, queries and request batches are truncated rather than
//! rejected. Each truncation is reported to a [`DiagnosticSink`] so the caller
//! decides whether it ends up in the log, in a counter, or nowhere.

use crate::index::DocId;
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A document had more words than the indexing cap.
    DocumentTruncated { doc_id: DocId, words: usize, kept: usize },
    /// A query had more distinct words than the query cap. `query` is the
    /// position of the query in its batch.
    QueryTruncated { query: usize, words: usize, kept: usize },
    /// A batch had more queries than the batch cap; the rest were omitted.
    RequestsTruncated { requests: usize, kept: usize },
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Logs every diagnostic as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::DocumentTruncated { doc_id, words, kept } => {
                tracing::warn!(doc_id, words, kept, "document has too many words, extra words ignored");
            }
            Diagnostic::QueryTruncated { query, words, kept } => {
                tracing::warn!(query, words, kept, "query has too many words, extra words ignored");
            }
            Diagnostic::RequestsTruncated { requests, kept } => {
                tracing::warn!(requests, kept, "too many requests, extra requests omitted");
            }
        }
    }
}

/// Keeps every diagnostic in memory, in report order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<Diagnostic> { self.events.lock().clone() }

    pub fn len(&self) -> usize { self.events.lock().len() }

    pub fn is_empty(&self) -> bool { self.events.lock().is_empty() }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}
