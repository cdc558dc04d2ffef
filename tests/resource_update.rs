//! Update and autofix tests.
//!
//! Each test loads a resource from wiremock, updates it and checks the exact
//! request sequence the server saw.

use std::sync::Arc;

use jira_resources::{
    AccountManager, JiraClient, JiraError, Options, Resource, ResourceKind, Transport,
    UpdateRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn issue_json(base: &str, summary: &str, assignee: Option<&str>) -> serde_json::Value {
    json!({
        "self": format!("{base}/rest/api/2/issue/10001"),
        "id": "10001",
        "key": "PROJ-1",
        "fields": {
            "summary": summary,
            "assignee": assignee.map(|name| json!({
                "self": format!("{base}/rest/api/2/user?username={name}"),
                "name": name
            }))
        }
    })
}

async fn mount_find(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/PROJ-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn load_issue(client: &JiraClient) -> Resource {
    let mut issue = Resource::new(
        ResourceKind::Issue,
        Arc::clone(client.options()),
        Arc::new(client.clone()),
    );
    issue.find("PROJ-1", &[]).await.unwrap();
    issue
}

#[tokio::test]
async fn test_update_puts_fields_and_reloads() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .and(body_json(json!({"fields": {"summary": "New"}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "New", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = JiraClient::new(Options::new(server.uri())).unwrap();
    let mut issue = load_issue(&client).await;
    issue
        .update(UpdateRequest::new().field("summary", "New"))
        .await
        .unwrap();

    assert_eq!(issue.path(&["fields", "summary"]).unwrap().as_str(), Some("New"));
}

#[tokio::test]
async fn test_validation_without_autofix_reloads_then_fails() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["Issues must be assigned."],
            "errors": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = JiraClient::new(Options::new(server.uri())).unwrap();
    let mut issue = load_issue(&client).await;
    let err = issue
        .update(UpdateRequest::new().field("summary", "New"))
        .await
        .unwrap_err();

    assert_eq!(
        err.validation_messages(),
        Some(&["Issues must be assigned.".to_string()][..])
    );
}

#[tokio::test]
async fn test_autofix_assigns_fallback_account_and_retries_once() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .and(body_json(json!({"fields": {"summary": "New"}})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["Issues must be assigned."],
            "errors": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .and(body_json(json!({
            "fields": {"summary": "New", "assignee": {"name": "jira-bot"}}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(
            &server.uri(),
            "New",
            Some("jira-bot"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        JiraClient::new(Options::new(server.uri()).with_autofix("jira-bot")).unwrap();
    let mut issue = load_issue(&client).await;
    issue
        .update(UpdateRequest::new().field("summary", "New"))
        .await
        .unwrap();

    let assignee = issue.path(&["fields", "assignee"]).unwrap().as_resource().unwrap();
    assert_eq!(assignee.kind(), ResourceKind::User);
    assert_eq!(assignee.attr("name").unwrap().as_str(), Some("jira-bot"));
}

#[tokio::test]
async fn test_async_update_runs_autofix_in_background() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .and(body_json(json!({"fields": {"summary": "New"}})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["Issues must be assigned."],
            "errors": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .and(body_json(json!({
            "fields": {"summary": "New", "assignee": {"name": "jira-bot"}}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client =
        JiraClient::new(Options::new(server.uri()).with_autofix("jira-bot")).unwrap();
    let mut issue = load_issue(&client).await;
    issue
        .update(
            UpdateRequest::new()
                .field("summary", "New")
                .async_dispatch(true),
        )
        .await
        .unwrap();

    let outcomes = client.jobs().join_all().await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].method, "PUT");
    assert!(matches!(outcomes[0].result, Ok(204)));

    let puts: Vec<serde_json::Value> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(puts.len(), 2);
    assert!(puts[0]["fields"].get("assignee").is_none());
    assert_eq!(puts[1]["fields"]["assignee"]["name"], "jira-bot");
}

#[tokio::test]
async fn test_autofix_second_failure_is_terminal() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["The reporter specified is not a user."],
            "errors": {}
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client =
        JiraClient::new(Options::new(server.uri()).with_autofix("jira-bot")).unwrap();
    let mut issue = load_issue(&client).await;
    let err = issue
        .update(UpdateRequest::new().field("summary", "New"))
        .await
        .unwrap_err();

    assert!(matches!(err, JiraError::Validation { .. }));
}

#[tokio::test]
async fn test_autofix_gives_up_on_unrecognized_messages() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": [],
            "errors": {"customfield_10010": "Option value is not valid"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client =
        JiraClient::new(Options::new(server.uri()).with_autofix("jira-bot")).unwrap();
    let mut issue = load_issue(&client).await;
    let err = issue
        .update(UpdateRequest::new().field("customfield_10010", "Bogus"))
        .await
        .unwrap_err();

    assert_eq!(
        err.validation_messages(),
        Some(&["Option value is not valid".to_string()][..])
    );
}

#[tokio::test]
async fn test_autofix_creates_missing_user_before_retry() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["User 'ghost' was not found in the system."],
            "errors": {}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/user"))
        .and(body_partial_json(json!({
            "name": "ghost",
            "emailAddress": "noreply@example.com",
            "directoryId": 10100,
            "active": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "ghost"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client =
        JiraClient::new(Options::new(server.uri()).with_autofix("jira-bot")).unwrap();
    let accounts: Arc<dyn AccountManager> = Arc::new(client.clone());
    let mut issue = load_issue(&client).await;
    issue
        .update(
            UpdateRequest::new()
                .field("assignee", json!({"name": "ghost"}))
                .accounts(accounts),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transport_failure_skips_reload() {
    // Nothing listens on port 1.
    let client = JiraClient::new(Options::new("http://127.0.0.1:1")).unwrap();
    let raw = issue_json("http://127.0.0.1:1", "Old", None);
    let mut issue = Resource::from_raw(
        ResourceKind::Issue,
        Arc::clone(client.options()),
        Arc::new(client),
        raw.clone(),
    );

    let err = issue
        .update(UpdateRequest::new().field("summary", "New"))
        .await
        .unwrap_err();

    assert!(matches!(err, JiraError::Request(_)));
    assert_eq!(issue.raw(), Some(&raw));
}

#[tokio::test]
async fn test_add_field_value_uses_update_verb() {
    let server = MockServer::start().await;
    mount_find(&server).await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/10001"))
        .and(body_json(json!({"update": {"labels": [{"add": "triaged"}]}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/10001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(&server.uri(), "Old", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = JiraClient::new(Options::new(server.uri())).unwrap();
    let mut issue = load_issue(&client).await;
    issue.add_field_value("labels", "triaged").await.unwrap();
}
