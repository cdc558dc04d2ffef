//! Mock Jira server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Jira REST
//! API for integration and end-to-end testing. Unlike wiremock which mocks at
//! the HTTP level per-test, this server keeps documents across requests, so a
//! PUT is visible to the reload GET that follows it.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jira_resources::mock_server::MockServer;
//! use jira_resources::{JiraClient, Options, Resource, ResourceKind, Transport};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = JiraClient::new(Options::new(server.url())).unwrap();
//!     let options = Arc::clone(client.options());
//!
//!     // Server comes with default fixtures
//!     let mut issue = Resource::new(ResourceKind::Issue, options, Arc::new(client));
//!     issue.find("PROJ-1", &[]).await.unwrap();
//!     assert_eq!(issue.label(), "PROJ-1");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{MockState, RecordedRequest};
