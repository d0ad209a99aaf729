//! Limits and defaults shared by the index builder, the query engine and the
//! resource loader. Runtime configuration comes from `config.json` and the
//! binaries' CLI arguments.

/// Version string expected in `config.json` under `config.version`.
pub const APP_VERSION: &str = "0.1";

/// Words longer than this many characters are dropped, not truncated.
pub const MAX_WORD_LEN: usize = 100;

/// Only the first this-many words of a document are indexed.
pub const MAX_DOCUMENT_WORDS: usize = 1000;

/// Maximum number of distinct words considered per query.
pub const MAX_QUERY_WORDS: usize = 10;

/// Maximum number of queries answered per batch; the rest are omitted.
pub const MAX_REQUESTS: usize = 1000;

/// Responses per query when `max_responses` is absent or not positive.
pub const DEFAULT_RESPONSES_LIMIT: usize = 5;

/// Upper bound for the `k` parameter accepted by the HTTP service.
pub const MAX_K: usize = 100;

/// Default resources directory holding `config.json`, `requests.json` and `answers.json`.
pub const DEFAULT_RESOURCES_DIR: &str = "resources";
