use anyhow::{Context, Result};
use mcp_open_meteo::{Config, Weather};
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_open_meteo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;
    tracing::info!(
        "Starting MCP Open-Meteo server (default units: {}, timeout: {}s)",
        config.default_units,
        config.timeout_seconds
    );

    let weather = Weather::new(config).context("Failed to build weather service")?;
    let server = weather.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
