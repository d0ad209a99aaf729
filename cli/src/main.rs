use anyhow::Result;
use clap::{Parser, Subcommand};
use docsearch_core::config::DEFAULT_RESOURCES_DIR;
use docsearch_core::resources::{load_config, load_documents, load_requests, save_answers, ResourcePaths};
use docsearch_core::{RelevanceResult, SearchEngine};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Answer ranked word queries over a fixed document collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer every query in requests.json and write answers.json
    Answer {
        /// Directory holding config.json, requests.json and answers.json
        #[arg(long, default_value = DEFAULT_RESOURCES_DIR)]
        resources: String,
        /// Worker threads used to index documents (defaults to available parallelism)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Run a single query and print the ranked documents as JSON
    Query {
        #[arg(long, default_value = DEFAULT_RESOURCES_DIR)]
        resources: String,
        /// Overrides max_responses from config.json
        #[arg(long)]
        limit: Option<usize>,
        query: String,
    },
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    results: &'a [RelevanceResult],
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Answer { resources, threads } => answer(&resources, threads),
        Commands::Query { resources, limit, query } => run_query(&resources, limit, &query),
    }
}

fn open_engine(paths: &ResourcePaths, threads: Option<usize>) -> Result<SearchEngine> {
    let config = load_config(paths)?;
    tracing::info!(
        name = config.name.as_deref().unwrap_or("docsearch"),
        version = config.version.as_deref().unwrap_or("-"),
        "starting"
    );
    let docs = load_documents(paths, &config);
    let mut engine = SearchEngine::default().with_responses_limit(config.max_responses);
    if let Some(threads) = threads {
        engine = engine.with_threads(threads);
    }
    engine.update_document_base(&docs);
    Ok(engine)
}

fn answer(resources: &str, threads: Option<usize>) -> Result<()> {
    let paths = ResourcePaths::new(resources);
    let engine = open_engine(&paths, threads)?;
    let requests = load_requests(&paths)?;
    let results = engine.search(&requests);
    save_answers(&paths, &results)?;
    let matched = results.iter().filter(|r| !r.is_empty()).count();
    tracing::info!(
        requests = requests.len(),
        answered = results.len(),
        matched,
        answers = %paths.answers().display(),
        "answers written"
    );
    Ok(())
}

fn run_query(resources: &str, limit: Option<usize>, query: &str) -> Result<()> {
    let paths = ResourcePaths::new(resources);
    let mut engine = open_engine(&paths, None)?;
    if let Some(limit) = limit {
        engine = engine.with_responses_limit(limit);
    }
    let results = engine.search(&[query]).pop().unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&QueryOutput { query, results: &results })?);
    Ok(())
}
