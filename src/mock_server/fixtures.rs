//! Test data fixtures for the mock server.
//!
//! Documents are plain JSON shaped like Jira REST responses. Links between
//! documents are built from `base`, the server URL.

use serde_json::{json, Value};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// A project with a lead and a single component.
    pub fn project(base: &str, key: &str, id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "key": key,
            "name": name,
            "description": "",
            "lead": Self::user(base, "admin", "Administrator"),
            "components": [Self::component(base, "10000", "Frontend")],
        })
    }

    /// A user, linked by username.
    pub fn user(base: &str, name: &str, display_name: &str) -> Value {
        json!({
            "self": format!("{base}/rest/api/2/user?username={name}"),
            "name": name,
            "displayName": display_name,
            "emailAddress": format!("{name}@example.com"),
            "active": true,
        })
    }

    pub fn component(base: &str, id: &str, name: &str) -> Value {
        json!({
            "self": format!("{base}/rest/api/2/component/{id}"),
            "id": id,
            "name": name,
        })
    }

    pub fn status(base: &str, id: &str, name: &str) -> Value {
        json!({
            "self": format!("{base}/rest/api/2/status/{id}"),
            "id": id,
            "name": name,
        })
    }

    pub fn resolution(base: &str, id: &str, name: &str) -> Value {
        json!({
            "self": format!("{base}/rest/api/2/resolution/{id}"),
            "id": id,
            "name": name,
        })
    }

    /// An open issue in project `PROJ` with labels, one component, and time
    /// tracking.
    pub fn issue(base: &str, key: &str, id: &str, summary: &str) -> Value {
        json!({
            "id": id,
            "key": key,
            "fields": {
                "summary": summary,
                "description": null,
                "issuetype": {
                    "self": format!("{base}/rest/api/2/issuetype/1"),
                    "id": "1",
                    "name": "Bug",
                },
                "project": {
                    "self": format!("{base}/rest/api/2/project/PROJ"),
                    "id": "10000",
                    "key": "PROJ",
                    "name": "Project",
                },
                "status": Self::status(base, "1", "Open"),
                "resolution": null,
                "assignee": Self::user(base, "jdoe", "Jane Doe"),
                "reporter": Self::user(base, "admin", "Administrator"),
                "labels": ["regression", "ui"],
                "components": [Self::component(base, "10000", "Frontend")],
                "timetracking": {
                    "originalEstimate": "1d",
                    "remainingEstimate": "4h",
                    "originalEstimateSeconds": 28800,
                    "remainingEstimateSeconds": 14400,
                },
            },
        })
    }

    /// A comment on issue `issue_id`.
    pub fn comment(base: &str, issue_id: &str, id: &str, body: &str) -> Value {
        json!({
            "self": format!("{base}/rest/api/2/issue/{issue_id}/comment/{id}"),
            "id": id,
            "body": body,
            "author": Self::user(base, "jdoe", "Jane Doe"),
            "visibility": null,
        })
    }

    /// A project role with one user actor.
    pub fn role(base: &str, project: &str, id: &str, name: &str) -> Value {
        json!({
            "self": format!("{base}/rest/api/2/project/{project}/role/{id}"),
            "id": id.parse::<u64>().unwrap_or_default(),
            "name": name,
            "actors": [{"type": "atlassian-user-role-actor", "name": "jdoe"}],
        })
    }

    /// The documents served by [`crate::mock_server::MockServer::start`],
    /// keyed by request path.
    ///
    /// Issue `PROJ-1` is stored under its key so that its generated `self`
    /// link round-trips through `refresh`.
    pub fn default_scenario(base: &str) -> Vec<(String, Value)> {
        vec![
            (
                "/rest/api/2/project/PROJ".to_string(),
                Self::project(base, "PROJ", "10000", "Project"),
            ),
            (
                "/rest/api/2/issue/PROJ-1".to_string(),
                Self::issue(base, "PROJ-1", "10001", "Login page crashes on submit"),
            ),
            (
                "/rest/api/2/issue/PROJ-1/comment/20001".to_string(),
                Self::comment(base, "PROJ-1", "20001", "Reproduced on staging"),
            ),
            (
                "/rest/api/2/project/PROJ/role/10002".to_string(),
                Self::role(base, "PROJ", "10002", "Developers"),
            ),
            (
                "/rest/api/2/status/1".to_string(),
                Self::status(base, "1", "Open"),
            ),
            (
                "/rest/api/2/resolution/1".to_string(),
                Self::resolution(base, "1", "Fixed"),
            ),
            (
                "/rest/api/2/user?username=jdoe".to_string(),
                Self::user(base, "jdoe", "Jane Doe"),
            ),
        ]
    }
}
