//! Jira REST client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Resource semantics live in [`crate::resource`]; this type only moves bytes
//! and owns the session's async job registry.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;

use crate::config::Options;
use crate::error::{JiraError, Result};
use crate::headers::CaseInsensitiveHeaders;
use crate::jobs::AsyncJobs;
use crate::traits::{AccountManager, RawResponse, Transport};

const USER_AGENT: &str = concat!("jira-resources/", env!("CARGO_PKG_VERSION"));

/// Basic-auth credentials.
#[derive(Clone)]
struct Credentials {
    user: String,
    token: String,
}

/// Low-level Jira client.
///
/// This struct is cheaply cloneable; clones share the connection pool and the
/// async job registry.
///
/// # Example
///
/// ```no_run
/// use jira_resources::{JiraClient, Options};
///
/// # fn example() -> jira_resources::Result<()> {
/// // Create from environment variables
/// let client = JiraClient::from_env()?;
///
/// // Or configure manually
/// let client = JiraClient::new(Options::new("https://jira.example.com"))?
///     .with_basic_auth("bot", "secret");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    options: Arc<Options>,
    credentials: Option<Credentials>,
    jobs: Arc<AsyncJobs>,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("server", &self.options.server)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a client from environment variables.
    ///
    /// Reads [`Options::from_env`] plus `JIRA_USER` and `JIRA_API_TOKEN` for
    /// basic authentication. Credentials are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if `JIRA_SERVER` is not set.
    pub fn from_env() -> Result<Self> {
        let client = Self::new(Options::from_env()?)?;
        match (env::var("JIRA_USER"), env::var("JIRA_API_TOKEN")) {
            (Ok(user), Ok(token)) => Ok(client.with_basic_auth(&user, &token)),
            _ => Ok(client),
        }
    }

    /// Create a new unauthenticated client for `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(options: Options) -> Result<Self> {
        url::Url::parse(&options.server)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(JiraError::Request)?;

        Ok(Self {
            http,
            options: Arc::new(options),
            credentials: None,
            jobs: Arc::new(AsyncJobs::new()),
        })
    }

    /// Authenticate every request with HTTP basic auth.
    pub fn with_basic_auth(mut self, user: &str, token: &str) -> Self {
        self.credentials = Some(Credentials {
            user: user.to_string(),
            token: token.to_string(),
        });
        self
    }

    /// The options this client was built with.
    pub fn options(&self) -> &Arc<Options> {
        &self.options
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.user, Some(&c.token)),
            None => request,
        }
    }

    /// Read status, body and `Retry-After` without judging the status.
    async fn read_response(response: Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let text = response.text().await.map_err(JiraError::Request)?;

        Ok(RawResponse {
            status,
            text,
            retry_after_secs,
        })
    }
}

#[async_trait]
impl Transport for JiraClient {
    #[tracing::instrument(skip(self, headers))]
    async fn get(
        &self,
        url: &str,
        headers: &CaseInsensitiveHeaders,
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        let request = self
            .http
            .get(url)
            .headers(headers.to_header_map())
            .query(params);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(JiraError::Request)?;

        Self::read_response(response).await
    }

    #[tracing::instrument(skip(self, body))]
    async fn put(&self, url: &str, body: String) -> Result<RawResponse> {
        let request = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(JiraError::Request)?;

        Self::read_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, url: &str, params: &[(String, String)]) -> Result<RawResponse> {
        let request = self.http.delete(url).query(params);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(JiraError::Request)?;

        Self::read_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(JiraError::Request)?;

        if !response.status().is_success() {
            return Self::read_response(response)
                .await?
                .error_for_status()
                .map(|_| Vec::new());
        }

        let bytes = response.bytes().await.map_err(JiraError::Request)?;
        Ok(bytes.to_vec())
    }

    fn jobs(&self) -> &AsyncJobs {
        &self.jobs
    }
}

#[async_trait]
impl AccountManager for JiraClient {
    #[tracing::instrument(skip(self))]
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        default_group_id: u64,
        active: bool,
    ) -> Result<()> {
        let url = format!("{}/rest/api/2/user", self.options.server);
        let body = json!({
            "name": name,
            "emailAddress": email,
            "displayName": name,
            "directoryId": default_group_id,
            "active": active,
        });

        let request = self.http.post(&url).json(&body);
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(JiraError::Request)?;

        Self::read_response(response).await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = JiraClient::new(Options::new("https://jira.example.com"))
            .unwrap()
            .with_basic_auth("bot", "test-token");
        let debug = format!("{:?}", client);
        assert!(debug.contains("JiraClient"));
        assert!(debug.contains("server"));
        // Token should not be in debug output
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_invalid_server_rejected() {
        let result = JiraClient::new(Options::new("not a url"));
        assert!(matches!(result, Err(JiraError::UrlError(_))));
    }

    #[test]
    fn test_clones_share_job_registry() {
        let client = JiraClient::new(Options::new("https://jira.example.com")).unwrap();
        let clone = client.clone();
        assert!(std::ptr::eq(client.jobs(), clone.jobs()));
    }
}
