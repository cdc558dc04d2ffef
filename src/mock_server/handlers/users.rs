//! User endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::mock_server::state::{MockState, RecordedRequest};

/// Body of `POST /rest/api/2/user`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub name: String,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// POST /rest/api/2/user
pub async fn create_user(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
    Json(body): Json<CreateUserBody>,
) -> impl IntoResponse {
    let mut state = state.write().await;
    state.requests.push(RecordedRequest {
        method: "POST".to_string(),
        path: uri.path().to_string(),
        query: None,
        body: Some(json!({"name": body.name})),
    });

    if state.accounts.contains(&body.name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "errorMessages": [],
                "errors": {"username": "A user with that username already exists."}
            })),
        )
            .into_response();
    }

    let key = format!("/rest/api/2/user?username={}", body.name);
    let user = json!({
        "self": format!("{}{}", state.base_url, key),
        "name": body.name,
        "emailAddress": body.email_address,
        "displayName": body.display_name.clone().unwrap_or_else(|| body.name.clone()),
        "active": body.active,
    });
    state.documents.insert(key, user.clone());
    state.accounts.push(body.name);

    (StatusCode::CREATED, Json(user)).into_response()
}
