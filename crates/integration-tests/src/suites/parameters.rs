use crate::checks::ChangesExpectation;
use crate::client::{ApiKey, MovieDbClient};
use anyhow::{Context, Result};
use chrono::{Days, Utc};
use tracing::info;

pub async fn run_tests(client: &MovieDbClient) -> Result<()> {
    test_empty_dates(client).await?;
    test_date_range(client).await?;
    test_different_language(client).await?;
    test_empty_language(client).await?;
    test_invalid_language(client).await?;
    Ok(())
}

pub async fn test_empty_dates(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Empty start and end dates should be accepted");

    let response = client
        .person_changes(
            &client.default_person(),
            ApiKey::Configured,
            &[("start_date", ""), ("end_date", "")],
        )
        .await?;

    ChangesExpectation::from_config(client.config())
        .evaluate_top_level(&response)
        .context("Empty dates request returned an unexpected response")?;

    info!("  ✅ Empty dates accepted");
    Ok(())
}

/// The API caps the window at 14 days.
pub async fn test_date_range(client: &MovieDbClient) -> Result<()> {
    info!("TEST: A one week date window should be accepted");

    let end = Utc::now().date_naive();
    let start = end
        .checked_sub_days(Days::new(7))
        .context("Start date out of range")?;
    let start = start.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();

    let response = client
        .person_changes(
            &client.default_person(),
            ApiKey::Configured,
            &[("start_date", start.as_str()), ("end_date", end.as_str())],
        )
        .await?;

    ChangesExpectation::from_config(client.config())
        .evaluate_top_level(&response)
        .with_context(|| format!("Date window {}..{} returned an unexpected response", start, end))?;

    info!("  ✅ Date window {}..{} accepted", start, end);
    Ok(())
}

pub async fn test_different_language(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Mexican Spanish language should be accepted");
    expect_changes_with_language(client, "es-MX").await?;
    info!("  ✅ Language es-MX accepted");
    Ok(())
}

pub async fn test_empty_language(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Empty language should fall back to the default");
    expect_changes_with_language(client, "").await?;
    info!("  ✅ Empty language accepted");
    Ok(())
}

pub async fn test_invalid_language(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Unknown language code should still return changes");
    expect_changes_with_language(client, "XX").await?;
    info!("  ✅ Language XX accepted");
    Ok(())
}

async fn expect_changes_with_language(client: &MovieDbClient, language: &str) -> Result<()> {
    let response = client
        .person_changes(
            &client.default_person(),
            ApiKey::Configured,
            &[("language", language)],
        )
        .await?;

    ChangesExpectation::from_config(client.config())
        .evaluate(&response)
        .with_context(|| format!("Language {:?} returned an unexpected response", language))?;
    Ok(())
}
