//! Integration tests for the movie database "person changes" endpoint.

use tracing::{error, info};

pub mod checks;
pub mod client;
pub mod config;

pub mod suites {
    pub mod auth;
    pub mod changes;
    pub mod parameters;
    pub mod stress;
}

use client::MovieDbClient;

/// Run every suite in order and return the names of the ones that failed.
pub async fn run_all_suites(client: &MovieDbClient) -> Vec<&'static str> {
    let mut failures = Vec::new();

    info!("\n=== Test Suite: Required Fields ===");
    if let Err(e) = suites::changes::run_tests(client).await {
        error!("Required fields tests failed: {:#}", e);
        failures.push("Required Fields");
    }

    info!("\n=== Test Suite: API Token ===");
    if let Err(e) = suites::auth::run_tests(client).await {
        error!("API token tests failed: {:#}", e);
        failures.push("API Token");
    }

    info!("\n=== Test Suite: Optional Parameters ===");
    if let Err(e) = suites::parameters::run_tests(client).await {
        error!("Optional parameter tests failed: {:#}", e);
        failures.push("Optional Parameters");
    }

    info!("\n=== Test Suite: Load ===");
    if let Err(e) = suites::stress::run_tests(client).await {
        error!("Load tests failed: {:#}", e);
        failures.push("Load");
    }

    failures
}
