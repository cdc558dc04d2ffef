//! Transport trait and the raw response it returns.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{JiraError, Result};
use crate::headers::CaseInsensitiveHeaders;
use crate::jobs::AsyncJobs;

/// Ordered query parameters.
pub type QueryParams = Vec<(String, String)>;

/// Carry HTTP calls for resources.
///
/// Implementations return `Ok` for every response the server produced,
/// whatever its status; only connection and protocol failures are `Err`.
/// Status interpretation belongs to the resource layer.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// GET `url` with extra headers and query parameters.
    async fn get(
        &self,
        url: &str,
        headers: &CaseInsensitiveHeaders,
        params: &[(String, String)],
    ) -> Result<RawResponse>;

    /// PUT a serialized JSON body to `url`.
    async fn put(&self, url: &str, body: String) -> Result<RawResponse>;

    /// DELETE `url` with query parameters.
    async fn delete(&self, url: &str, params: &[(String, String)]) -> Result<RawResponse>;

    /// GET `url` and return the body bytes unchanged.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// The session's async job registry.
    fn jobs(&self) -> &AsyncJobs;
}

/// A response as seen by the resource layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text.
    pub text: String,
    /// Parsed `Retry-After` header, if any.
    pub retry_after_secs: Option<u64>,
}

impl RawResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
            retry_after_secs: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decoded error messages from a Jira error body.
    ///
    /// Collects the `errorMessages` array followed by the values of the
    /// `errors` object. Falls back to `message`/`error` strings, then to the
    /// raw body if it is not JSON.
    pub fn error_messages(&self) -> Vec<String> {
        let json: Value = match serde_json::from_str(&self.text) {
            Ok(json) => json,
            Err(_) if self.text.trim().is_empty() => return Vec::new(),
            Err(_) => return vec![self.text.clone()],
        };

        let mut messages: Vec<String> = json
            .get("errorMessages")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(errors) = json.get("errors").and_then(Value::as_object) {
            messages.extend(errors.values().filter_map(|v| v.as_str().map(str::to_string)));
        }

        if messages.is_empty() {
            for key in ["message", "error"] {
                if let Some(msg) = json.get(key).and_then(Value::as_str) {
                    messages.push(msg.to_string());
                    break;
                }
            }
        }

        messages
    }

    /// Convert a failed response into the matching error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        if self.status == 429 {
            return Err(JiraError::RateLimited {
                retry_after_secs: self.retry_after_secs,
            });
        }

        let messages = self.error_messages();
        if self.status == 400 {
            return Err(JiraError::Validation { messages });
        }

        let message = if messages.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            messages.join("; ")
        };
        Err(JiraError::ApiError {
            message,
            status_code: Some(self.status),
        })
    }

    /// Decode the body as JSON after checking the status.
    ///
    /// An empty body decodes to an empty object. A non-empty body that is
    /// not JSON is logged at error level and returned as
    /// [`JiraError::Decode`].
    pub fn json(self) -> Result<Value> {
        let response = self.error_for_status()?;
        if response.text.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&response.text).map_err(|source| {
            tracing::error!("{}:\n{}", source, response.text);
            JiraError::Decode {
                source,
                body: response.text,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_messages_collects_both_shapes() {
        let body = json!({
            "errorMessages": ["Issues must be assigned."],
            "errors": {"summary": "The summary is invalid because it contains newline characters."}
        });
        let response = RawResponse::new(400, body.to_string());

        assert_eq!(
            response.error_messages(),
            vec![
                "Issues must be assigned.".to_string(),
                "The summary is invalid because it contains newline characters.".to_string(),
            ]
        );
    }

    #[test]
    fn test_error_for_status_400_is_validation() {
        let response = RawResponse::new(400, r#"{"errorMessages":["nope"]}"#);
        let err = response.error_for_status().unwrap_err();
        assert_eq!(err.validation_messages(), Some(&["nope".to_string()][..]));
    }

    #[test]
    fn test_error_for_status_other_is_api_error() {
        let response = RawResponse::new(404, r#"{"errorMessages":["Issue Does Not Exist"]}"#);
        match response.error_for_status() {
            Err(JiraError::ApiError {
                message,
                status_code,
            }) => {
                assert_eq!(message, "Issue Does Not Exist");
                assert_eq!(status_code, Some(404));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_json_empty_body_is_empty_object() {
        let value = RawResponse::new(204, "").json().unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_json_invalid_body_is_decode_error() {
        let err = RawResponse::new(200, "<html>").json().unwrap_err();
        match err {
            JiraError::Decode { body, .. } => assert_eq!(body, "<html>"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
