// crates/integration-tests/src/main.rs

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use moviedb_integration_tests::client::MovieDbClient;
use moviedb_integration_tests::config::Config;
use moviedb_integration_tests::run_all_suites;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Starting Movie DB Integration Tests");
    info!("===================================");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().map_err(anyhow::Error::msg)?;
    info!("Configuration loaded: {}", config);

    if config.api_key.is_empty() {
        warn!("MOVIEDB_API_KEY is not set; requests that need a valid key will fail");
    }

    let client = MovieDbClient::new(config)
        .context("Failed to create test client")?;

    let failures = run_all_suites(&client).await;

    // Summary
    info!("\n=== Test Summary ===");
    if failures.is_empty() {
        info!("✅ All test suites passed!");
        Ok(())
    } else {
        error!("❌ Failed test suites:");
        for failure in failures {
            error!("  - {}", failure);
        }
        anyhow::bail!("Integration tests failed")
    }
}
