use probe_harness::ProbeError;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::client::ApiResponse;
use crate::config::Config;

/// Expected shape of a successful person-changes response.
#[derive(Debug, Clone)]
pub struct ChangesExpectation {
    pub status: StatusCode,
    pub changes_key: String,
    pub change_key: String,
}

impl ChangesExpectation {
    pub fn from_config(config: &Config) -> Self {
        Self {
            status: StatusCode::OK,
            changes_key: config.changes_key.clone(),
            change_key: config.change_key.clone(),
        }
    }

    /// Status and top-level key only.
    pub fn evaluate_top_level(&self, response: &ApiResponse) -> Result<(), ProbeError> {
        self.decode(response).map(|_| ())
    }

    /// Full check: status, top-level key and, when there are changes, the
    /// key of the first change.
    pub fn evaluate(&self, response: &ApiResponse) -> Result<(), ProbeError> {
        let object = self.decode(response)?;

        let changes = match object.get(&self.changes_key) {
            Some(Value::Array(changes)) => changes,
            other => {
                return Err(ProbeError::decode(format!(
                    "'{}' should be a list, got: {}",
                    self.changes_key,
                    other.unwrap_or(&Value::Null)
                )))
            }
        };

        // The content is live data, so only the first entry is inspected.
        if let Some(first) = changes.first() {
            let entry = first.as_object().ok_or_else(|| {
                ProbeError::decode(format!("A change entry should be an object, got: {}", first))
            })?;
            if !entry.contains_key(&self.change_key) {
                return Err(ProbeError::check(format!(
                    "API result is missing the '{}' object in the response.",
                    self.change_key
                )));
            }
        }

        Ok(())
    }

    fn decode(&self, response: &ApiResponse) -> Result<Map<String, Value>, ProbeError> {
        if response.status != self.status {
            return Err(ProbeError::check(format!(
                "The Movie DB API did not return a successful response as expected. Status returned: {}",
                response.status.as_u16()
            )));
        }

        let object = match response.json().map_err(ProbeError::decode)? {
            Value::Object(object) => object,
            other => {
                return Err(ProbeError::decode(format!(
                    "Expected a JSON object, got: {}",
                    other
                )))
            }
        };

        if !object.contains_key(&self.changes_key) {
            return Err(ProbeError::check(format!(
                "Response API did not contain the expected default '{}' key.",
                self.changes_key
            )));
        }

        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expectation() -> ChangesExpectation {
        ChangesExpectation::from_config(&Config::default())
    }

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_empty_changes_pass() {
        expectation()
            .evaluate(&response(200, r#"{"changes":[]}"#))
            .expect("empty changes should pass");
    }

    #[test]
    fn test_first_change_with_key_passes() {
        let body = r#"{"changes":[{"key":"biography","items":[]},{"items":[]}]}"#;
        expectation()
            .evaluate(&response(200, body))
            .expect("only the first change is inspected");
    }

    #[test]
    fn test_bad_status_skips_body() {
        // Body is not JSON; a decode fault here would mean it was parsed.
        let err = expectation()
            .evaluate(&response(401, "<html>nope</html>"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Check(_)));
        assert!(err.to_string().contains("Status returned: 401"));
    }

    #[test]
    fn test_malformed_body_is_a_decode_fault() {
        let err = expectation()
            .evaluate(&response(200, "{\"changes\":"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[test]
    fn test_non_object_body_is_a_decode_fault() {
        let err = expectation().evaluate(&response(200, "[1,2]")).unwrap_err();
        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[test]
    fn test_missing_top_level_key() {
        let err = expectation()
            .evaluate(&response(200, r#"{"status_code":34}"#))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Check(_)));
        assert!(err.to_string().contains("'changes'"));
    }

    #[test]
    fn test_missing_change_key() {
        let err = expectation()
            .evaluate(&response(200, r#"{"changes":[{"items":[]}]}"#))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Check(_)));
        assert!(err.to_string().contains("'key'"));
    }

    #[test]
    fn test_changes_not_a_list() {
        let err = expectation()
            .evaluate(&response(200, r#"{"changes":{"key":"x"}}"#))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[test]
    fn test_change_key_is_configurable() {
        let expectation = ChangesExpectation {
            change_key: "keys".to_string(),
            ..expectation()
        };
        let err = expectation
            .evaluate(&response(200, r#"{"changes":[{"key":"name"}]}"#))
            .unwrap_err();
        assert!(err.to_string().contains("'keys'"));
    }

    #[test]
    fn test_top_level_ignores_change_entries() {
        expectation()
            .evaluate_top_level(&response(200, r#"{"changes":[{"items":[]}]}"#))
            .expect("top-level check should not look inside changes");
    }
}
