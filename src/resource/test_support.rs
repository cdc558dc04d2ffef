//! In-process transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Options;
use crate::error::Result;
use crate::headers::CaseInsensitiveHeaders;
use crate::jobs::AsyncJobs;
use crate::traits::{RawResponse, Transport};

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

/// Replays queued responses in order; an empty queue answers `200 {}`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<Call>>,
    jobs: AsyncJobs,
}

impl ScriptedTransport {
    pub fn with_responses(responses: impl IntoIterator<Item = RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, method: &'static str, url: &str, body: Option<String>) -> RawResponse {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RawResponse::new(200, "{}"))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        _headers: &CaseInsensitiveHeaders,
        _params: &[(String, String)],
    ) -> Result<RawResponse> {
        Ok(self.answer("GET", url, None))
    }

    async fn put(&self, url: &str, body: String) -> Result<RawResponse> {
        Ok(self.answer("PUT", url, Some(body)))
    }

    async fn delete(&self, url: &str, _params: &[(String, String)]) -> Result<RawResponse> {
        Ok(self.answer("DELETE", url, None))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.answer("GET", url, None).text.into_bytes())
    }

    fn jobs(&self) -> &AsyncJobs {
        &self.jobs
    }
}

pub(crate) fn offline_options() -> Arc<Options> {
    Arc::new(Options::new("https://jira.example.com"))
}

pub(crate) fn offline_session() -> Arc<dyn Transport> {
    ScriptedTransport::with_responses([])
}
