use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;

use query_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: ServerConfig = argh::from_env();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    event!(Level::INFO, "listening on http://{addr}");

    query_server::run(listener).await.context("server error")
}
