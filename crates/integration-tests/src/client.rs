use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;

/// Which `api_key` query parameter a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKey<'a> {
    /// The key from the configuration.
    Configured,
    /// An explicit key, used to probe token validation.
    Custom(&'a str),
    /// No `api_key` parameter at all.
    Missing,
}

/// Status and raw body of one API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

/// Client for the movie database REST API.
#[derive(Clone)]
pub struct MovieDbClient {
    http_client: reqwest::Client,
    config: Arc<Config>,
    base: Url,
}

impl MovieDbClient {
    pub fn new(config: Config) -> Result<Self> {
        let base = config.api_base().map_err(anyhow::Error::msg)?;
        let http_client = build_http_client(&config)?;

        Ok(Self {
            http_client,
            config: Arc::new(config),
            base,
        })
    }

    /// A client with the same configuration but its own connection pool.
    pub fn detached(&self) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(&self.config)?,
            config: self.config.clone(),
            base: self.base.clone(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configured person id as a path segment.
    pub fn default_person(&self) -> String {
        self.config.person_id.to_string()
    }

    /// Build `{base}person/{person}/changes` with the key and extra params.
    ///
    /// Empty parameter values are kept ("language=") since the API treats
    /// them differently from absent ones.
    pub fn person_changes_url(
        &self,
        person: &str,
        api_key: ApiKey<'_>,
        params: &[(&str, &str)],
    ) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("person/{}/changes", person))
            .with_context(|| format!("Failed to build changes URL for person {}", person))?;

        {
            let mut query = url.query_pairs_mut();
            match api_key {
                ApiKey::Configured => {
                    query.append_pair("api_key", &self.config.api_key);
                }
                ApiKey::Custom(key) => {
                    query.append_pair("api_key", key);
                }
                ApiKey::Missing => {}
            }
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        // A bare "?" is left behind when nothing was appended.
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// GET the changes of a person.
    pub async fn person_changes(
        &self,
        person: &str,
        api_key: ApiKey<'_>,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let url = self.person_changes_url(person, api_key, params)?;
        debug!("Request: GET {}", redact(&url));

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to send request to the movie API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        debug!("Response: {} ({} bytes)", status, body.len());
        Ok(ApiResponse { status, body })
    }
}

fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to create HTTP client")
}

/// The URL with the api key value masked, for logging.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" && !v.is_empty() {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    if !pairs.is_empty() {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn client() -> MovieDbClient {
        MovieDbClient::new(Config {
            api_key: "abc123".to_string(),
            base_url: "http://localhost:9000/3".to_string(),
            ..Config::default()
        })
        .expect("client")
    }

    #[test]
    fn test_url_with_configured_key() {
        let url = client()
            .person_changes_url("1245", ApiKey::Configured, &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/3/person/1245/changes?api_key=abc123"
        );
    }

    #[test]
    fn test_url_keeps_empty_params() {
        let url = client()
            .person_changes_url(
                "1245",
                ApiKey::Custom("e109253d2212"),
                &[("start_date", ""), ("end_date", "")],
            )
            .unwrap();
        assert_eq!(url.query(), Some("api_key=e109253d2212&start_date=&end_date="));
    }

    #[test]
    fn test_url_without_key_has_no_query() {
        let url = client()
            .person_changes_url("3", ApiKey::Missing, &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/3/person/3/changes");
    }

    #[test]
    fn test_redact_masks_api_key() {
        let url = client()
            .person_changes_url("3", ApiKey::Configured, &[("language", "es-MX")])
            .unwrap();
        let shown = redact(&url);
        assert!(!shown.contains("abc123"));
        assert!(shown.contains("language=es-MX"));
    }

    #[test]
    fn test_response_json() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: r#"{"changes":[{"key":"biography","items":[]}]}"#.to_string(),
        };
        assert_json_eq!(
            response.json().unwrap(),
            json!({ "changes": [{ "key": "biography", "items": [] }] })
        );
    }
}
