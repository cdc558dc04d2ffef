//! Jira REST resource object model.
//!
//! Turns the nested JSON documents returned by the Jira REST API into a
//! navigable graph of [`Resource`]s and [`AttributeHolder`]s, and gives every
//! resource kind the same find/update/delete semantics.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use jira_resources::{JiraClient, Resource, ResourceKind, Transport, UpdateRequest};
//!
//! #[tokio::main]
//! async fn main() -> jira_resources::Result<()> {
//!     // Create client from environment variables
//!     let client = JiraClient::from_env()?;
//!     let options = Arc::clone(client.options());
//!     let session: Arc<dyn Transport> = Arc::new(client);
//!
//!     // Load an issue; nested objects are materialized on the way in
//!     let mut issue = Resource::new(ResourceKind::Issue, options, Arc::clone(&session));
//!     issue.find("PROJ-1", &[]).await?;
//!     let status = issue.path(&["fields", "status"])?;
//!     println!("{issue} is {}", status.as_resource().map(|s| s.label()).unwrap_or_default());
//!
//!     // Update it; the issue is reloaded afterwards
//!     issue.update(UpdateRequest::new().field("summary", "Renamed")).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Registry`] maps a resource's `self` URL to a [`ResourceKind`]; the
//!   first matching pattern wins.
//! - [`materialize`] walks JSON and builds the graph, consulting the registry
//!   for every nested object that has a `self` link.
//! - [`Resource::update`] and [`Resource::delete`] implement the mutation
//!   protocol, including autofix retries and async dispatch through the
//!   session's [`AsyncJobs`].
//! - [`Transport`] and [`AccountManager`] are the seams to the network;
//!   [`JiraClient`] implements both with reqwest.
//!
//! # Configuration
//!
//! [`Options::from_env`] reads:
//!
//! - `JIRA_SERVER` (required) - Base URL, e.g. `https://jira.example.com`
//! - `JIRA_REST_PATH` (optional) - REST path segment, defaults to `api`
//! - `JIRA_REST_API_VERSION` (optional) - defaults to `2`
//! - `JIRA_ASYNC` (optional) - dispatch updates and deletes asynchronously
//! - `JIRA_AUTOFIX` (optional) - fallback account; enables autofix
//!
//! [`JiraClient::from_env`] additionally reads `JIRA_USER` and
//! `JIRA_API_TOKEN` for basic authentication.

pub mod cli;
mod client;
mod config;
mod error;
mod headers;
mod jobs;
pub mod output;
pub mod resource;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::JiraClient;
pub use config::Options;
pub use error::{JiraError, Result};
pub use headers::CaseInsensitiveHeaders;
pub use jobs::{AsyncJobs, JobOutcome};

// Re-export collaborator traits
pub use traits::{AccountManager, QueryParams, RawResponse, Transport};

// Re-export the resource model
pub use resource::{
    materialize, AttributeHolder, DeleteRequest, Registry, Resource, ResourceId, ResourceKind,
    UpdateRequest, Value,
};
