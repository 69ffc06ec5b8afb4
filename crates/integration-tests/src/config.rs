use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Configuration loaded from `MOVIEDB_*` environment variables.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// API key sent as the `api_key` query parameter.
    #[serde(default)]
    pub api_key: String,

    /// Root of the REST API, e.g. "https://api.themoviedb.org/3/".
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Person whose changes are requested by the positive tests.
    #[serde(default = "default_person_id")]
    pub person_id: u64,

    /// Number of simultaneous requests in the load suite.
    /// The API limits open connections per key, so keep this modest.
    #[serde(default = "default_load_limit")]
    pub load_limit: usize,

    /// Per-request timeout of the HTTP client, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Optional upper bound for each load probe, in seconds.
    pub probe_timeout_seconds: Option<u64>,

    /// Top-level key every changes response must carry.
    #[serde(default = "default_changes_key")]
    pub changes_key: String,

    /// Key every change entry must carry.
    #[serde(default = "default_change_key")]
    pub change_key: String,
}

/// Upper bound for `load_limit`; the API throttles long before this.
pub const MAX_LOAD_LIMIT: usize = 1000;

fn default_base_url() -> String { "https://api.themoviedb.org/3/".to_string() }
fn default_person_id() -> u64 { 1245 }
fn default_load_limit() -> usize { 30 }
fn default_request_timeout() -> u64 { 30 }
fn default_changes_key() -> String { "changes".to_string() }
fn default_change_key() -> String { "key".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            person_id: default_person_id(),
            load_limit: default_load_limit(),
            request_timeout_seconds: default_request_timeout(),
            probe_timeout_seconds: None,
            changes_key: default_changes_key(),
            change_key: default_change_key(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("MOVIEDB_").from_env::<Config>()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.load_limit == 0 || self.load_limit > MAX_LOAD_LIMIT {
            return Err(format!(
                "MOVIEDB_LOAD_LIMIT must be between 1 and {}, got {}.",
                MAX_LOAD_LIMIT, self.load_limit
            ));
        }
        if self.changes_key.is_empty() || self.change_key.is_empty() {
            return Err("MOVIEDB_CHANGES_KEY and MOVIEDB_CHANGE_KEY must not be empty.".to_string());
        }
        self.api_base()?;
        Ok(())
    }

    /// The parsed base URL, always ending in '/' so relative paths join under it.
    pub fn api_base(&self) -> Result<Url, String> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| format!("Invalid MOVIEDB_BASE_URL {:?}: {}", self.base_url, e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_seconds.map(Duration::from_secs)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Base URL: {}, Person: {}, Load limit: {}, API key: {}",
            self.base_url,
            self.person_id,
            self.load_limit,
            if self.api_key.is_empty() { "<unset>" } else { "<set>" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests that touch the environment must not overlap.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "MOVIEDB_API_KEY",
        "MOVIEDB_BASE_URL",
        "MOVIEDB_PERSON_ID",
        "MOVIEDB_LOAD_LIMIT",
        "MOVIEDB_REQUEST_TIMEOUT_SECONDS",
        "MOVIEDB_PROBE_TIMEOUT_SECONDS",
        "MOVIEDB_CHANGES_KEY",
        "MOVIEDB_CHANGE_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env().expect("Failed to load config from env");
        config.validate().expect("Default config should be valid");

        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, "https://api.themoviedb.org/3/");
        assert_eq!(config.person_id, 1245);
        assert_eq!(config.load_limit, 30);
        assert_eq!(config.probe_timeout(), None);
        assert_eq!(config.changes_key, "changes");
        assert_eq!(config.change_key, "key");
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_load_overrides_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("MOVIEDB_API_KEY", "abc123");
        env::set_var("MOVIEDB_BASE_URL", "http://127.0.0.1:9000/3");
        env::set_var("MOVIEDB_LOAD_LIMIT", "8");
        env::set_var("MOVIEDB_PROBE_TIMEOUT_SECONDS", "5");
        env::set_var("MOVIEDB_CHANGE_KEY", "keys");

        let config = Config::from_env().expect("Failed to load config from env");
        config.validate().expect("Config validation failed");

        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.load_limit, 8);
        assert_eq!(config.probe_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.change_key, "keys");
        assert_eq!(
            config.api_base().unwrap().as_str(),
            "http://127.0.0.1:9000/3/"
        );

        clear_env();
    }

    #[test]
    fn test_zero_load_limit_is_rejected() {
        let config = Config {
            load_limit: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_load_limit_is_rejected() {
        let config = Config {
            load_limit: usize::MAX,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("MOVIEDB_LOAD_LIMIT"));

        let at_bound = Config {
            load_limit: MAX_LOAD_LIMIT,
            ..Config::default()
        };
        assert!(at_bound.validate().is_ok());
    }

    #[test]
    fn test_clear_env_resets_every_variable() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("MOVIEDB_CHANGES_KEY", "results");
        env::set_var("MOVIEDB_REQUEST_TIMEOUT_SECONDS", "2");
        clear_env();

        let config = Config::from_env().expect("Failed to load config from env");
        assert_eq!(config.changes_key, "changes");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_unparsable_base_url_is_rejected() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("MOVIEDB_BASE_URL"));
    }

    #[test]
    fn test_display_hides_api_key() {
        let config = Config {
            api_key: "super-secret".to_string(),
            ..Config::default()
        };
        let shown = config.to_string();
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("<set>"));
    }
}
