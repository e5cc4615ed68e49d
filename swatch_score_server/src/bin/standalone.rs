use swatch_score_server::{ServerConfig, start_server};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ServerConfig::from_env();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let server = start_server(cfg).await?;
        // Park until the server task ends.
        server.task.await?;
        Ok::<(), anyhow::Error>(())
    })
}
