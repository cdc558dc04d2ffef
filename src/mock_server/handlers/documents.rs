//! Generic document endpoint handlers.
//!
//! Every path under `/rest/` is served from the document store.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::mock_server::state::{MockState, RecordedRequest};

fn not_found(path: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "errorMessages": [format!("No resource found at {path}")],
            "errors": {}
        })),
    )
        .into_response()
}

fn record(state: &mut MockState, method: &str, uri: &Uri, body: Option<Value>) {
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body,
    });
}

/// GET /rest/*
pub async fn get_document(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
) -> impl IntoResponse {
    let mut state = state.write().await;
    record(&mut state, "GET", &uri, None);

    let document = state
        .lookup_key(uri.path(), uri.query())
        .and_then(|key| state.get_document(&key));

    match document {
        Some(document) => (StatusCode::OK, Json(document)).into_response(),
        None => not_found(uri.path()),
    }
}

/// PUT /rest/*
pub async fn put_document(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
    body: String,
) -> impl IntoResponse {
    let payload: Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "errorMessages": [format!("Invalid JSON: {e}")],
                    "errors": {}
                })),
            )
                .into_response()
        }
    };

    let mut state = state.write().await;
    record(&mut state, "PUT", &uri, Some(payload.clone()));

    if let Some(messages) = state.take_rejection(uri.path()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "errorMessages": messages,
                "errors": {}
            })),
        )
            .into_response();
    }

    let Some(key) = state.lookup_key(uri.path(), uri.query()) else {
        return not_found(uri.path());
    };

    let applied = payload
        .as_object()
        .map(|payload| state.apply_update(&key, payload))
        .unwrap_or(false);

    if applied {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "errorMessages": ["Request body must be a JSON object"],
                "errors": {}
            })),
        )
            .into_response()
    }
}

/// DELETE /rest/*
pub async fn delete_document(
    State(state): State<Arc<RwLock<MockState>>>,
    uri: Uri,
) -> impl IntoResponse {
    let mut state = state.write().await;
    record(&mut state, "DELETE", &uri, None);

    // Query parameters on DELETE are options, not part of the address.
    match state.documents.remove(uri.path()) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(uri.path()),
    }
}
