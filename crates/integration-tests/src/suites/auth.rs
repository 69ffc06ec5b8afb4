use crate::client::{ApiKey, MovieDbClient};
use anyhow::{ensure, Result};
use reqwest::StatusCode;
use tracing::info;

/// Person used by the token tests; any existing id works.
const PERSON: &str = "3";

pub async fn run_tests(client: &MovieDbClient) -> Result<()> {
    test_invalid_token(client).await?;
    test_invalid_short_token(client).await?;
    test_invalid_long_token(client).await?;
    test_missing_token(client).await?;
    Ok(())
}

pub async fn test_invalid_token(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Invalid token of valid length should be rejected");
    expect_unauthorized(client, ApiKey::Custom("ffffffffffffffffffffffffffffffff")).await?;
    info!("  ✅ Invalid token rejected");
    Ok(())
}

pub async fn test_invalid_short_token(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Too short token should be rejected");
    expect_unauthorized(client, ApiKey::Custom("e109253d2212")).await?;
    info!("  ✅ Short token rejected");
    Ok(())
}

pub async fn test_invalid_long_token(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Too long token should be rejected");
    expect_unauthorized(
        client,
        ApiKey::Custom("e109253d2212e109253d2212e109253d2212"),
    )
    .await?;
    info!("  ✅ Long token rejected");
    Ok(())
}

pub async fn test_missing_token(client: &MovieDbClient) -> Result<()> {
    info!("TEST: Missing token should be rejected");
    expect_unauthorized(client, ApiKey::Missing).await?;
    info!("  ✅ Missing token rejected");
    Ok(())
}

async fn expect_unauthorized(client: &MovieDbClient, api_key: ApiKey<'_>) -> Result<()> {
    let response = client.person_changes(PERSON, api_key, &[]).await?;

    ensure!(
        response.status == StatusCode::UNAUTHORIZED,
        "The Movie DB API did not return the expected error response. Status returned: {}",
        response.status.as_u16()
    );
    Ok(())
}
