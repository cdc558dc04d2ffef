//! Connection options shared by every resource.

use std::env;

use crate::error::{JiraError, Result};
use crate::headers::CaseInsensitiveHeaders;

const DEFAULT_REST_PATH: &str = "api";
const DEFAULT_REST_API_VERSION: &str = "2";

/// Options every resource consults when building URLs and dispatching calls.
///
/// # Example
///
/// ```
/// use jira_resources::Options;
///
/// let options = Options::new("https://jira.example.com")
///     .with_autofix("jira-bot")
///     .with_async(false);
/// assert_eq!(options.rest_base(), "https://jira.example.com/rest/api/2/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Server base URL without trailing slash.
    pub server: String,
    /// REST path segment, `api` for core Jira.
    pub rest_path: String,
    /// REST API version segment.
    pub rest_api_version: String,
    /// Headers sent with every GET.
    pub headers: CaseInsensitiveHeaders,
    /// Default dispatch mode for `update` and `delete`.
    pub async_dispatch: bool,
    /// Fallback account used by autofix. `None` disables autofix.
    pub autofix: Option<String>,
}

impl Options {
    /// Options for `server` with the default REST path and version.
    pub fn new(server: impl Into<String>) -> Self {
        let server = server.into();
        Self {
            server: server.trim_end_matches('/').to_string(),
            rest_path: DEFAULT_REST_PATH.to_string(),
            rest_api_version: DEFAULT_REST_API_VERSION.to_string(),
            headers: CaseInsensitiveHeaders::json_defaults(),
            async_dispatch: false,
            autofix: None,
        }
    }

    /// Read options from environment variables.
    ///
    /// Uses `JIRA_SERVER` (required), and optionally `JIRA_REST_PATH`,
    /// `JIRA_REST_API_VERSION`, `JIRA_ASYNC` and `JIRA_AUTOFIX`.
    ///
    /// # Errors
    ///
    /// Returns an error if `JIRA_SERVER` is not set.
    pub fn from_env() -> Result<Self> {
        let server = env::var("JIRA_SERVER").map_err(|_| {
            JiraError::ConfigMissing("JIRA_SERVER environment variable not set".to_string())
        })?;

        let mut options = Self::new(server);
        if let Ok(path) = env::var("JIRA_REST_PATH") {
            options.rest_path = path;
        }
        if let Ok(version) = env::var("JIRA_REST_API_VERSION") {
            options.rest_api_version = version;
        }
        options.async_dispatch = env::var("JIRA_ASYNC")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        options.autofix = env::var("JIRA_AUTOFIX").ok().filter(|v| !v.is_empty());

        Ok(options)
    }

    pub fn with_rest_path(mut self, rest_path: impl Into<String>) -> Self {
        self.rest_path = rest_path.into();
        self
    }

    pub fn with_rest_api_version(mut self, version: impl Into<String>) -> Self {
        self.rest_api_version = version.into();
        self
    }

    pub fn with_headers(mut self, headers: CaseInsensitiveHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_async(mut self, async_dispatch: bool) -> Self {
        self.async_dispatch = async_dispatch;
        self
    }

    /// Enable autofix with `account` as the fallback reporter/assignee.
    pub fn with_autofix(mut self, account: impl Into<String>) -> Self {
        self.autofix = Some(account.into());
        self
    }

    /// `{server}/rest/{rest_path}/{rest_api_version}/`
    pub fn rest_base(&self) -> String {
        format!(
            "{}/rest/{}/{}/",
            self.server, self.rest_path, self.rest_api_version
        )
    }

    /// Base URL of the GreenHopper (agile) REST API.
    pub fn greenhopper_base(&self) -> String {
        format!("{}/rest/greenhopper/1.0/", self.server)
    }
}
