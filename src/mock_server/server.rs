//! Mock Jira REST server.
//!
//! Provides an axum-based HTTP server that serves resource documents the way
//! the Jira REST API does.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// A mock Jira server for testing.
///
/// The server runs in the background on a random local port. Documents are
/// served from [`MockState`], so tests can seed and inspect them.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server seeded with [`Fixtures::default_scenario`].
    pub async fn start() -> Self {
        Self::with_state_fn(|base| {
            let mut state = MockState::new();
            state.documents.extend(Fixtures::default_scenario(base));
            state
        })
        .await
    }

    /// Start a mock server with empty state.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    ///
    /// `base_url` is overwritten with the address the server binds to, so
    /// generated `self` links point back at this server.
    pub async fn with_state(state: MockState) -> Self {
        Self::with_state_fn(move |_| state).await
    }

    /// Start a mock server whose state is built from its own base URL.
    ///
    /// Use this when seeded documents need `self` links to the server.
    pub async fn with_state_fn(build: impl FnOnce(&str) -> MockState) -> Self {
        // Bind first so documents can link back to the real address
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");
        let url = format!("http://{}", addr);

        let mut state = build(&url);
        state.base_url = url.clone();
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url,
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this as the `server` option when creating a `JiraClient`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route(
                "/rest/api/2/user",
                post(handlers::create_user)
                    .get(handlers::get_document)
                    .put(handlers::put_document)
                    .delete(handlers::delete_document),
            )
            .route(
                "/rest/*path",
                get(handlers::get_document)
                    .put(handlers::put_document)
                    .delete(handlers::delete_document),
            )
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
