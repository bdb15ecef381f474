mod cli;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "dashboard=debug,charts=info,common=info,reqwest=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG pisa el filtro por defecto
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli::run().await
}
