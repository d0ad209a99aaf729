use anyhow::Result;
use clap::Parser;
use docsearch_core::config::DEFAULT_RESOURCES_DIR;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Serve ranked word queries over the documents listed in config.json.
#[derive(Parser)]
#[command(name = "docsearch-server")]
struct Args {
    /// Directory holding config.json and the documents it lists
    #[arg(long, default_value = DEFAULT_RESOURCES_DIR)]
    resources: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    tracing::info!(resources = %args.resources, "indexing documents");
    let state = server::load_state(&args.resources)?;
    let limit = state.responses_limit;
    let app = server::router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, default_k = limit, "search server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
