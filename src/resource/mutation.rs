//! Update and delete for every resource kind.
//!
//! The generic protocol PUTs a merged payload to `self`, runs autofix on a
//! rejected update when enabled, and reloads the resource afterwards whether
//! or not the update succeeded. Kind-specific payload and parameter rules are
//! selected by [`ResourceKind`].

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::autofix::{send_update, PatchContext, UpdateJob};
use super::entity::Resource;
use super::kind::ResourceKind;
use crate::error::{JiraError, Result};
use crate::traits::{AccountManager, QueryParams};

/// Arguments of [`Resource::update`].
///
/// `fields` is the field mapping; `args` are additional named values merged
/// next to it. How the two are combined depends on the resource kind.
#[derive(Clone, Default)]
pub struct UpdateRequest {
    fields: Option<Map<String, Value>>,
    args: Map<String, Value>,
    async_dispatch: Option<bool>,
    accounts: Option<Arc<dyn AccountManager>>,
}

impl fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("fields", &self.fields)
            .field("args", &self.args)
            .field("async_dispatch", &self.async_dispatch)
            .field("accounts", &self.accounts.is_some())
            .finish()
    }
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole field mapping.
    pub fn fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Set one entry of the field mapping.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set one additional named value.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Override the options' default dispatch mode for this call.
    pub fn async_dispatch(mut self, async_dispatch: bool) -> Self {
        self.async_dispatch = Some(async_dispatch);
        self
    }

    /// Account manager used when autofix finds a missing user.
    pub fn accounts(mut self, accounts: Arc<dyn AccountManager>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Users and groups to add to a project role.
    pub fn role_actors<U, G>(users: U, groups: G) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        let users: Vec<String> = users.into_iter().map(Into::into).collect();
        let groups: Vec<String> = groups.into_iter().map(Into::into).collect();
        let mut request = Self::new();
        if !users.is_empty() {
            request = request.arg("users", users);
        }
        if !groups.is_empty() {
            request = request.arg("groups", groups);
        }
        request
    }

    /// Remote link `object` plus optional `globalId`, `application` and
    /// `relationship` args.
    pub fn remote_link(object: Value) -> Self {
        Self::new().arg("object", object)
    }
}

/// Arguments of [`Resource::delete`].
#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    params: QueryParams,
    async_dispatch: Option<bool>,
}

impl DeleteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn async_dispatch(mut self, async_dispatch: bool) -> Self {
        self.async_dispatch = Some(async_dispatch);
        self
    }

    /// Issue: also delete sub-tasks.
    pub fn delete_subtasks(self, delete_subtasks: bool) -> Self {
        self.param("deleteSubtasks", delete_subtasks)
    }

    /// Component: move issues to this component.
    pub fn move_issues_to(self, component: impl ToString) -> Self {
        self.param("moveIssuesTo", component)
    }

    /// Watchers: the user to remove.
    pub fn username(self, username: impl ToString) -> Self {
        self.param("username", username)
    }

    /// Worklog: one of `new`, `leave`, `manual`, `auto`.
    pub fn adjust_estimate(self, mode: impl ToString) -> Self {
        self.param("adjustEstimate", mode)
    }

    /// Worklog: estimate to set with `adjustEstimate=new`.
    pub fn new_estimate(self, estimate: impl ToString) -> Self {
        self.param("newEstimate", estimate)
    }

    /// Worklog: amount to add with `adjustEstimate=manual`.
    pub fn increase_by(self, amount: impl ToString) -> Self {
        self.param("increaseBy", amount)
    }

    /// Version: fix version to move issues to.
    pub fn move_fix_issues_to(self, version: impl ToString) -> Self {
        self.param("moveFixIssuesTo", version)
    }

    /// Version: affected version to move issues to.
    pub fn move_affected_issues_to(self, version: impl ToString) -> Self {
        self.param("moveAffectedIssuesTo", version)
    }

    fn has(&self, name: &str) -> bool {
        self.params.iter().any(|(k, _)| k == name)
    }
}

impl Resource {
    /// Update this resource on the server, then reload it.
    ///
    /// The reload happens whether the PUT succeeded or failed, so local state
    /// always reflects what the server holds. In async mode the PUT (and any
    /// autofix retry) is dispatched to the session's job registry and the
    /// reload runs at once, so it may observe the resource before the PUT
    /// lands. Call [`crate::AsyncJobs::join_all`] and then
    /// [`Resource::refresh`] to see the updated state.
    ///
    /// # Errors
    ///
    /// Transport errors are returned before any reload. A validation failure
    /// that autofix could not resolve, or that autofix is disabled for, is
    /// returned as [`JiraError::Validation`] after the reload.
    #[tracing::instrument(skip(self, request), fields(kind = %self.kind()))]
    pub async fn update(&mut self, request: UpdateRequest) -> Result<()> {
        let payload = shape_update(self, &request)?;
        self.send_payload(payload, request.async_dispatch, request.accounts)
            .await
    }

    /// PUT `payload` as-is, bypassing kind-specific shaping.
    pub(crate) async fn send_payload(
        &mut self,
        payload: Map<String, Value>,
        async_dispatch: Option<bool>,
        accounts: Option<Arc<dyn AccountManager>>,
    ) -> Result<()> {
        let url = self.self_url()?.to_string();
        let job = UpdateJob {
            session: Arc::clone(self.session()),
            url: url.clone(),
            payload,
            patch_context: self.options().autofix.clone().map(|account| PatchContext {
                account,
                current_summary: self
                    .path(&["fields", "summary"])
                    .ok()
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
            }),
            accounts,
        };

        if async_dispatch.unwrap_or(self.options().async_dispatch) {
            self.session().jobs().dispatch("PUT", url, send_update(job));
            return self.refresh().await;
        }

        let outcome = send_update(job).await;
        if let Err(JiraError::Request(_)) = outcome {
            return outcome.map(|_| ());
        }

        let reload = self.refresh().await;
        match (outcome, reload) {
            (Err(update_err), Err(reload_err)) => {
                tracing::warn!(error = %reload_err, "reload after failed update also failed");
                Err(update_err)
            }
            (Err(update_err), Ok(())) => Err(update_err),
            (Ok(_), reload) => reload,
        }
    }

    /// Delete this resource on the server.
    ///
    /// In async mode the DELETE is dispatched to the session's job registry
    /// and failures are only visible in the outcomes of
    /// [`crate::AsyncJobs::join_all`].
    ///
    /// # Errors
    ///
    /// [`JiraError::UnsupportedOperation`] if a kind-required parameter is
    /// missing, [`JiraError::Request`] on transport failure, or the status
    /// error of a rejected DELETE.
    #[tracing::instrument(skip(self, request), fields(kind = %self.kind()))]
    pub async fn delete(&self, request: DeleteRequest) -> Result<()> {
        let params = shape_delete(self.kind(), &request)?;
        let url = self.self_url()?.to_string();
        let session = Arc::clone(self.session());

        if request
            .async_dispatch
            .unwrap_or(self.options().async_dispatch)
        {
            let job_url = url.clone();
            let job_session = Arc::clone(&session);
            session.jobs().dispatch("DELETE", url, async move {
                let response = job_session.delete(&job_url, &params).await?;
                Ok::<_, JiraError>(response.error_for_status()?.status)
            });
            return Ok(());
        }

        session.delete(&url, &params).await?.error_for_status()?;
        Ok(())
    }
}

/// Build the PUT payload for `resource`'s kind.
fn shape_update(resource: &Resource, request: &UpdateRequest) -> Result<Map<String, Value>> {
    let kind = resource.kind();
    match kind {
        ResourceKind::Issue => {
            let fields = request.fields.clone().unwrap_or_else(|| request.args.clone());
            let mut payload = Map::new();
            payload.insert("fields".to_string(), Value::Object(fields));
            Ok(payload)
        }
        ResourceKind::Comment => Ok(select(&merged(request), &["body", "visibility"])),
        ResourceKind::RemoteLink => {
            let all = merged(request);
            if !all.contains_key("object") {
                return Err(unsupported(kind, "remote link update requires 'object'"));
            }
            Ok(select(
                &all,
                &["object", "globalId", "application", "relationship"],
            ))
        }
        ResourceKind::Role => {
            let all = merged(request);
            let users = actors(all.get("users"));
            let groups = actors(all.get("groups"));
            if users.is_null() && groups.is_null() {
                return Err(unsupported(kind, "role update requires users or groups"));
            }
            let id = resource
                .id()
                .ok_or_else(|| unsupported(kind, "role has no id"))?;
            let mut payload = Map::new();
            payload.insert("id".to_string(), json!(id));
            payload.insert(
                "categorisedActors".to_string(),
                json!({
                    "atlassian-user-role-actor": users,
                    "atlassian-group-role-actor": groups,
                }),
            );
            Ok(payload)
        }
        _ => Ok(merged(request)),
    }
}

/// Build the DELETE query for `kind`.
fn shape_delete(kind: ResourceKind, request: &DeleteRequest) -> Result<QueryParams> {
    let mut params = request.params.clone();
    match kind {
        ResourceKind::Issue if !request.has("deleteSubtasks") => {
            params.push(("deleteSubtasks".to_string(), "false".to_string()));
        }
        ResourceKind::Watchers if !request.has("username") => {
            return Err(unsupported(kind, "removing a watcher requires 'username'"));
        }
        _ => {}
    }
    Ok(params)
}

fn merged(request: &UpdateRequest) -> Map<String, Value> {
    let mut payload = request.fields.clone().unwrap_or_default();
    payload.extend(request.args.clone());
    payload
}

fn select(payload: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| payload.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

/// A single name becomes a one-element list; absent stays null.
fn actors(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(name)) => json!([name]),
        Some(other) => other.clone(),
    }
}

fn unsupported(kind: ResourceKind, reason: &str) -> JiraError {
    JiraError::UnsupportedOperation {
        kind: kind.name(),
        reason: reason.to_string(),
    }
}
