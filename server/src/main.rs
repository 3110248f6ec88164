use anyhow::Result;
use clap::Parser;
use docsearch_core::persist::IndexPaths;
use docsearch_core::QueryEngine;
use docsearch_server::build_app;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, env = "DOCSEARCH_INDEX", default_value = "./index")]
    index: String,
    /// Host to bind
    #[arg(long, env = "DOCSEARCH_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "DOCSEARCH_PORT", default_value_t = 8080)]
    port: u16,
    /// Build the index at startup instead of on the first query
    #[arg(long, default_value_t = false)]
    eager: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    // Lives for the whole process; dropped on shutdown.
    let engine = Arc::new(QueryEngine::from_file(IndexPaths::new(&args.index).snapshot()));
    if args.eager {
        let engine = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || engine.load()).await??;
    }
    let app = build_app(engine);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, index = %args.index, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
