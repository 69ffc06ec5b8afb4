use crate::checks::ChangesExpectation;
use crate::client::{ApiKey, MovieDbClient};
use anyhow::{ensure, Context, Result};
use serde_json::{Map, Value};
use tracing::info;

pub async fn run_tests(client: &MovieDbClient) -> Result<()> {
    test_required_fields(client).await?;
    test_invalid_person_id(client).await?;
    Ok(())
}

/// Only the api key is required. Without dates the API reports the last
/// 24 hours, so the content can only be checked for shape.
pub async fn test_required_fields(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Valid key alone should return the person's changes");

    let response = client
        .person_changes(&client.default_person(), ApiKey::Configured, &[])
        .await?;

    ChangesExpectation::from_config(client.config())
        .evaluate(&response)
        .context("Required fields request returned an unexpected response")?;

    info!("  ✅ Changes returned for person {}", client.default_person());
    Ok(())
}

pub async fn test_invalid_person_id(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Unknown person id should return an empty change list");

    let response = client
        .person_changes("not_valid", ApiKey::Configured, &[])
        .await?;

    let expectation = ChangesExpectation::from_config(client.config());
    expectation
        .evaluate_top_level(&response)
        .context("Invalid person request returned an unexpected response")?;

    let body: Value = response.json().context("Response body is not JSON")?;
    let mut empty = Map::new();
    empty.insert(expectation.changes_key.clone(), Value::Array(Vec::new()));
    let empty = Value::Object(empty);
    ensure!(
        body == empty,
        "An empty '{}' tag was expected, however the result was: {}",
        expectation.changes_key,
        response.body
    );

    info!("  ✅ Empty change list for invalid person");
    Ok(())
}
