pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod index;
pub mod resources;
pub mod search;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use index::{DocId, InvertedIndex, Posting};
pub use search::{RelevanceResult, SearchEngine, SearchServer};
