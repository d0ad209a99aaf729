use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, HeaderValue, StatusCode}, routing::{get, post}, Json, Router};
use docsearch_core::config::MAX_K;
use docsearch_core::resources::{load_config, load_documents, AnswersFile, ResourcePaths};
use docsearch_core::{IndexBuilder, InvertedIndex, RelevanceResult, SearchServer};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<RelevanceResult>,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub requests: Vec<String>,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub documents: Vec<String>,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub num_docs: u32,
    pub num_words: usize,
}

/// The current index lives behind an `Arc` that handlers clone out of the
/// lock; a rebuild swaps in a new `Arc` and never mutates the old one.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RwLock<Arc<InvertedIndex>>>,
    pub responses_limit: usize,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(index: InvertedIndex, responses_limit: usize, admin_token: Option<String>) -> Self {
        Self { index: Arc::new(RwLock::new(Arc::new(index))), responses_limit, admin_token }
    }

    fn snapshot(&self) -> Arc<InvertedIndex> { Arc::clone(&self.index.read()) }
}

/// Load `config.json` from `resources_dir` and index the documents it lists.
pub fn load_state(resources_dir: &str) -> Result<AppState> {
    let paths = ResourcePaths::new(resources_dir);
    let config = load_config(&paths)?;
    tracing::info!(
        name = config.name.as_deref().unwrap_or("docsearch"),
        files = config.files.len(),
        max_responses = config.max_responses,
        "config loaded"
    );
    let docs = load_documents(&paths, &config);
    let index = IndexBuilder::new().build(&docs);
    tracing::info!(num_docs = index.num_docs(), num_words = index.num_words(), "index ready");
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    if admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, reindexing is disabled");
    }
    Ok(AppState::new(index, config.max_responses, admin_token))
}

pub fn build_app(resources_dir: String) -> Result<Router> {
    Ok(router(load_state(&resources_dir)?))
}

/// Origins from `CORS_ALLOW_ORIGIN` (comma separated); any origin when unset or unparsable.
fn cors_from_env() -> CorsLayer {
    let origins: Vec<HeaderValue> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let allow_origin = if origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(allow_origin).allow_methods(Any).allow_headers(Any)
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/search/batch", post(batch_handler))
        .route("/index", post(index_handler))
        .with_state(app_state)
        .layer(cors_from_env())
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    // k=0 means "use the configured limit", like max_responses in config.json
    let k = params.k.filter(|k| *k > 0).unwrap_or(state.responses_limit).min(MAX_K);
    let index = state.snapshot();
    let results = SearchServer::new(&index).with_responses_limit(k).search_query(&params.q);
    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), results })
}

pub async fn batch_handler(State(state): State<AppState>, Json(body): Json<BatchRequest>) -> Json<AnswersFile> {
    let index = state.snapshot();
    let results = SearchServer::new(&index).with_responses_limit(state.responses_limit).search(&body.requests);
    Json(AnswersFile::from_results(&results))
}

pub async fn index_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let index = tokio::task::spawn_blocking(move || IndexBuilder::new().build(&body.documents))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("index build failed: {e}")))?;
    let response = IndexResponse { num_docs: index.num_docs(), num_words: index.num_words() };
    *state.index.write() = Arc::new(index);
    tracing::info!(num_docs = response.num_docs, num_words = response.num_words, "index replaced");
    Ok(Json(response))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
