//! Mock server state management.
//!
//! Provides the in-memory document store for the mock Jira server.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// A request the mock server received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

/// Shared state for the mock server.
///
/// Documents are keyed by request path (`/rest/api/2/issue/PROJ-1`), with the
/// query string appended for query-addressed resources
/// (`/rest/api/2/user?username=jdoe`).
#[derive(Debug, Default)]
pub struct MockState {
    /// Base URL the server is listening on; set at startup.
    pub base_url: String,

    /// Stored resource documents.
    pub documents: HashMap<String, Value>,

    /// Validation messages to answer the next PUTs to a path with.
    pub rejections: HashMap<String, VecDeque<Vec<String>>>,

    /// Every request received, in order.
    pub requests: Vec<RecordedRequest>,

    /// Accounts created through `POST /rest/api/2/user`.
    pub accounts: Vec<String>,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a document at `path`.
    pub fn with_document(mut self, path: &str, document: Value) -> Self {
        self.documents.insert(path.to_string(), document);
        self
    }

    /// Answer the next PUT to `path` with HTTP 400 and `messages`.
    ///
    /// Calls queue up; each PUT consumes one.
    pub fn reject_next_put(mut self, path: &str, messages: &[&str]) -> Self {
        self.queue_rejection(path, messages);
        self
    }

    pub fn queue_rejection(&mut self, path: &str, messages: &[&str]) {
        self.rejections
            .entry(path.to_string())
            .or_default()
            .push_back(messages.iter().map(|m| m.to_string()).collect());
    }

    pub(crate) fn take_rejection(&mut self, path: &str) -> Option<Vec<String>> {
        self.rejections.get_mut(path).and_then(VecDeque::pop_front)
    }

    /// Find the document for a request, preferring the query-qualified key.
    pub fn lookup_key(&self, path: &str, query: Option<&str>) -> Option<String> {
        query
            .map(|q| format!("{path}?{q}"))
            .filter(|key| self.documents.contains_key(key))
            .or_else(|| self.documents.contains_key(path).then(|| path.to_string()))
    }

    /// Get a document, filling in its `self` link if it has none.
    pub fn get_document(&self, key: &str) -> Option<Value> {
        let mut document = self.documents.get(key)?.clone();
        if let Some(map) = document.as_object_mut() {
            map.entry("self")
                .or_insert_with(|| Value::String(format!("{}{}", self.base_url, key)));
        }
        Some(document)
    }

    /// Apply an update payload to a stored document.
    ///
    /// `fields` entries are merged into the document's `fields`, `update`
    /// verbs (`add`, `set`, `remove`) are applied to the named fields, and
    /// any other key replaces the top-level value.
    pub fn apply_update(&mut self, key: &str, payload: &Map<String, Value>) -> bool {
        let Some(document) = self.documents.get_mut(key).and_then(Value::as_object_mut) else {
            return false;
        };

        for (name, value) in payload {
            match (name.as_str(), value) {
                ("fields", Value::Object(updates)) => {
                    let fields = document
                        .entry("fields")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Some(fields) = fields.as_object_mut() {
                        fields.extend(updates.clone());
                    }
                }
                ("update", Value::Object(verbs)) => {
                    let fields = document
                        .entry("fields")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Some(fields) = fields.as_object_mut() {
                        for (field, operations) in verbs {
                            apply_verbs(fields, field, operations);
                        }
                    }
                }
                _ => {
                    document.insert(name.clone(), value.clone());
                }
            }
        }
        true
    }

    /// Requests received for `method` on `path`.
    pub fn requests_for(&self, method: &str, path: &str) -> Vec<&RecordedRequest> {
        self.requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

fn apply_verbs(fields: &mut Map<String, Value>, field: &str, operations: &Value) {
    for operation in operations.as_array().into_iter().flatten() {
        let Some(operation) = operation.as_object() else {
            continue;
        };
        if let Some(value) = operation.get("set") {
            fields.insert(field.to_string(), value.clone());
        }
        if let Some(value) = operation.get("add") {
            let list = fields
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(list) = list.as_array_mut() {
                list.push(value.clone());
            }
        }
        if let Some(value) = operation.get("remove") {
            if let Some(list) = fields.get_mut(field).and_then(Value::as_array_mut) {
                list.retain(|v| v != value);
            }
        }
    }
}
