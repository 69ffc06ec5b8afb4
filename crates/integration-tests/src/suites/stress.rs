use crate::checks::ChangesExpectation;
use crate::client::{ApiKey, MovieDbClient};
use anyhow::{ensure, Context, Result};
use probe_harness::{Harness, ProbeError};
use std::sync::Arc;
use tracing::info;

pub async fn run_tests(client: &MovieDbClient) -> Result<()> {
    test_concurrent_changes_requests(client).await?;
    Ok(())
}

/// Same as the required fields test, fired `load_limit` times at once.
pub async fn test_concurrent_changes_requests(client: &MovieDbClient) -> Result<()> {
    let config = client.config();
    info!(
        "TEST: {} simultaneous changes requests should all succeed",
        config.load_limit
    );

    let mut harness = Harness::new(config.load_limit);
    if let Some(timeout) = config.probe_timeout() {
        harness = harness.with_timeout(timeout);
    }

    let person = client.default_person();
    let expectation = Arc::new(ChangesExpectation::from_config(config));

    let verdict = harness
        .run(|_| {
            // Every probe gets its own connection.
            let connection = client.detached();
            let person = person.clone();
            let expectation = expectation.clone();

            async move {
                let client = connection.map_err(ProbeError::transport)?;
                let response = client
                    .person_changes(&person, ApiKey::Configured, &[])
                    .await
                    .map_err(ProbeError::transport)?;
                expectation.evaluate(&response)
            }
        })
        .await
        .context("Load test could not be orchestrated")?;

    ensure!(verdict.passed(), "{}", verdict.summary());

    info!("  ✅ All {} requests succeeded", harness.count());
    Ok(())
}
