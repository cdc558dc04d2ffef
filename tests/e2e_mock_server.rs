//! E2E tests using the mock Jira server.
//!
//! These tests exercise full workflows against the mock server, where a PUT
//! is visible to the reload that follows it.

#![cfg(feature = "test-server")]

use std::sync::Arc;

use jira_resources::mock_server::{Fixtures, MockServer, MockState};
use jira_resources::{
    AccountManager, DeleteRequest, JiraClient, JiraError, Options, Resource, ResourceKind,
    Transport, UpdateRequest,
};
use serde_json::json;

fn client_for(options: Options) -> JiraClient {
    JiraClient::new(options).unwrap()
}

fn resource(client: &JiraClient, kind: ResourceKind) -> Resource {
    Resource::new(kind, Arc::clone(client.options()), Arc::new(client.clone()))
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    let result = reqwest::Client::new()
        .get(format!("{}/health", url))
        .send()
        .await;

    assert!(result.is_err());
}

// =============================================================================
// Issue Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_find_issue_and_follow_nested_resources() {
    let server = MockServer::start().await;
    let client = client_for(Options::new(server.url()));

    let mut issue = resource(&client, ResourceKind::Issue);
    issue.find("PROJ-1", &[]).await.unwrap();

    assert_eq!(issue.labels().unwrap(), ["regression", "ui"]);
    assert!(issue.has_component(&["Frontend"]).unwrap());
    assert!(!issue.is_resolved().unwrap());
    assert_eq!(
        issue.permalink().unwrap(),
        format!("{}/browse/PROJ-1", server.url())
    );

    let status = issue.path(&["fields", "status"]).unwrap().as_resource().unwrap();
    let mut status = Resource::from_raw(
        status.kind(),
        Arc::clone(status.options()),
        Arc::clone(status.session()),
        status.raw().cloned().unwrap(),
    );
    status.refresh().await.unwrap();
    assert_eq!(status.label(), "Open");

    server.shutdown().await;
}

#[tokio::test]
async fn test_update_issue_round_trips_through_reload() {
    let server = MockServer::start().await;
    let client = client_for(Options::new(server.url()));

    let mut issue = resource(&client, ResourceKind::Issue);
    issue.find("PROJ-1", &[]).await.unwrap();
    issue
        .update(UpdateRequest::new().field("summary", "Login page no longer crashes"))
        .await
        .unwrap();

    assert_eq!(
        issue.path(&["fields", "summary"]).unwrap().as_str(),
        Some("Login page no longer crashes")
    );

    issue.add_field_value("labels", "triaged").await.unwrap();
    assert!(issue.has_label(&["triaged"]).unwrap());

    let state = server.state();
    let state = state.read().await;
    assert_eq!(state.requests_for("PUT", "/rest/api/2/issue/PROJ-1").len(), 2);
    assert_eq!(state.requests_for("GET", "/rest/api/2/issue/PROJ-1").len(), 3);

    drop(state);
    server.shutdown().await;
}

#[tokio::test]
async fn test_autofix_workflow_against_stateful_server() {
    let server = MockServer::start().await;
    server.state().write().await.queue_rejection(
        "/rest/api/2/issue/PROJ-1",
        &["Issues must be assigned."],
    );
    let client = client_for(Options::new(server.url()).with_autofix("jira-bot"));

    let mut issue = resource(&client, ResourceKind::Issue);
    issue.find("PROJ-1", &[]).await.unwrap();
    issue
        .update(UpdateRequest::new().fields(
            json!({"summary": "Reassigned"}).as_object().unwrap().clone(),
        ))
        .await
        .unwrap();

    let assignee = issue.path(&["fields", "assignee"]).unwrap();
    assert_eq!(assignee.attr("name").unwrap().as_str(), Some("jira-bot"));

    let state = server.state();
    let state = state.read().await;
    let puts = state.requests_for("PUT", "/rest/api/2/issue/PROJ-1");
    assert_eq!(puts.len(), 2);
    assert!(puts[0].body.as_ref().unwrap()["fields"].get("assignee").is_none());
    assert_eq!(
        puts[1].body.as_ref().unwrap()["fields"]["assignee"]["name"],
        "jira-bot"
    );

    drop(state);
    server.shutdown().await;
}

#[tokio::test]
async fn test_missing_user_is_created_by_account_manager() {
    let server = MockServer::start().await;
    server.state().write().await.queue_rejection(
        "/rest/api/2/issue/PROJ-1",
        &["User 'ghost' does not exist."],
    );
    let client = client_for(Options::new(server.url()).with_autofix("jira-bot"));
    let accounts: Arc<dyn AccountManager> = Arc::new(client.clone());

    let mut issue = resource(&client, ResourceKind::Issue);
    issue.find("PROJ-1", &[]).await.unwrap();
    issue
        .update(
            UpdateRequest::new()
                .field("assignee", json!({"name": "ghost"}))
                .accounts(accounts),
        )
        .await
        .unwrap();

    let state = server.state();
    let state = state.read().await;
    assert_eq!(state.accounts, ["ghost"]);

    drop(state);
    let mut ghost = resource(&client, ResourceKind::User);
    ghost.find("ghost", &[]).await.unwrap();
    assert_eq!(ghost.attr("active").unwrap().as_bool(), Some(false));

    server.shutdown().await;
}

// =============================================================================
// Role and Delete Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_role_update_sends_categorised_actors() {
    let server = MockServer::start().await;
    let client = client_for(Options::new(server.url()));

    let mut role = resource(&client, ResourceKind::Role);
    role.find(("PROJ", "10002"), &[]).await.unwrap();
    role.update(UpdateRequest::role_actors(["alice"], Vec::<String>::new()))
        .await
        .unwrap();

    let state = server.state();
    let state = state.read().await;
    let puts = state.requests_for("PUT", "/rest/api/2/project/PROJ/role/10002");
    assert_eq!(
        puts[0].body.as_ref().unwrap()["categorisedActors"]["atlassian-user-role-actor"],
        json!(["alice"])
    );

    drop(state);
    server.shutdown().await;
}

#[tokio::test]
async fn test_async_delete_then_join() {
    let server = MockServer::start().await;
    let client = client_for(Options::new(server.url()).with_async(true));

    let mut comment = resource(&client, ResourceKind::Comment);
    comment.find(("PROJ-1", "20001"), &[]).await.unwrap();
    comment.delete(DeleteRequest::new()).await.unwrap();

    let outcomes = client.jobs().join_all().await;
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_ok());

    let err = comment.refresh().await.unwrap_err();
    assert!(matches!(
        err,
        JiraError::ApiError {
            status_code: Some(404),
            ..
        }
    ));

    server.shutdown().await;
}

#[tokio::test]
async fn test_custom_state() {
    let server = MockServer::with_state_fn(|base| {
        MockState::new().with_document(
            "/rest/api/2/issue/ACME-7",
            Fixtures::issue(base, "ACME-7", "70007", "Custom issue"),
        )
    })
    .await;
    let client = client_for(Options::new(server.url()));

    let mut issue = resource(&client, ResourceKind::Issue);
    issue.find("ACME-7", &[]).await.unwrap();
    assert_eq!(issue.label(), "ACME-7");

    let mut missing = resource(&client, ResourceKind::Issue);
    let err = missing.find("PROJ-1", &[]).await.unwrap_err();
    assert!(matches!(
        err,
        JiraError::ApiError {
            status_code: Some(404),
            ..
        }
    ));

    server.shutdown().await;
}
