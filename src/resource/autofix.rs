//! Autofix: one bounded retry of a rejected update after patching the payload.
//!
//! When an update is rejected with HTTP 400 and autofix is enabled, the
//! server's validation messages are checked against [`RULES`] in order. Each
//! recognized message patches the payload at most once. A message naming a
//! missing user additionally creates that account before the retry. Exactly
//! one retry is made.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::{JiraError, Result};
use crate::traits::{AccountManager, RawResponse, Transport, DEFAULT_GROUP_ID, PLACEHOLDER_EMAIL};

/// Inputs the patch functions may read.
#[derive(Debug, Clone)]
pub struct PatchContext {
    /// Fallback reporter/assignee.
    pub account: String,
    /// Summary of the loaded resource, used when the payload has none.
    pub current_summary: Option<String>,
}

/// A recognized validation message and the patch it triggers.
#[derive(Debug)]
pub struct AutofixRule {
    pub name: &'static str,
    pub message: &'static str,
    /// Apply the patch; returns false if nothing was changed.
    pub patch: fn(&mut Map<String, Value>, &PatchContext) -> bool,
}

/// Patch rules in evaluation order.
pub const RULES: &[AutofixRule] = &[
    AutofixRule {
        name: "reporter",
        message: "The reporter specified is not a user.",
        patch: set_reporter,
    },
    AutofixRule {
        name: "assignee",
        message: "Issues must be assigned.",
        patch: set_assignee,
    },
    AutofixRule {
        name: "subtask-parent",
        message: "Issue type is a sub-task but parent issue key or id not specified.",
        patch: convert_subtask,
    },
    AutofixRule {
        name: "summary-newlines",
        message: "The summary is invalid because it contains newline characters.",
        patch: strip_summary_newlines,
    },
];

static MISSING_USER: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        r"^User '(.*)' was not found in the system\.",
        r"^User '(.*)' does not exist\.",
    ]
    .map(|pattern| Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern: {e}")))
});

/// What autofix decided to do about one failed update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutofixPlan {
    /// Names of the rules whose patch changed the payload.
    pub applied: Vec<&'static str>,
    /// Account to create before retrying.
    pub missing_user: Option<String>,
}

impl AutofixPlan {
    /// Whether a retry could succeed where the first attempt did not.
    pub fn is_actionable(&self) -> bool {
        !self.applied.is_empty() || self.missing_user.is_some()
    }
}

/// Apply every rule recognized in `errors` to `payload`.
///
/// Unrecognized messages are ignored.
pub fn plan(errors: &[String], payload: &mut Map<String, Value>, ctx: &PatchContext) -> AutofixPlan {
    let mut plan = AutofixPlan::default();

    for rule in RULES {
        if errors.iter().any(|e| e == rule.message) && (rule.patch)(payload, ctx) {
            tracing::warn!(rule = rule.name, "autofix: patched payload, will retry the update");
            plan.applied.push(rule.name);
        }
    }

    plan.missing_user = errors.iter().rev().find_map(|error| {
        MISSING_USER
            .iter()
            .find_map(|re| re.captures(error))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    });

    plan
}

/// States of one autofix-enabled update.
#[derive(Debug)]
enum State {
    Sending,
    Failed(Vec<String>),
    Patched { missing_user: Option<String> },
    GaveUp(Vec<String>),
    Retrying,
    Done(u16),
}

/// Settings for [`send_update`].
#[derive(Clone)]
pub(crate) struct UpdateJob {
    pub session: Arc<dyn Transport>,
    pub url: String,
    pub payload: Map<String, Value>,
    /// `None` disables autofix.
    pub patch_context: Option<PatchContext>,
    pub accounts: Option<Arc<dyn AccountManager>>,
}

/// PUT the payload, running autofix on a 400 when enabled.
///
/// Returns the status of the accepted PUT. Transport errors end the job at
/// once; a rejected retry is a terminal error.
pub(crate) async fn send_update(job: UpdateJob) -> Result<u16> {
    let UpdateJob {
        session,
        url,
        mut payload,
        patch_context,
        accounts,
    } = job;
    let mut retried = false;
    let mut state = State::Sending;

    loop {
        tracing::trace!(?state, %url, "update state");
        state = match state {
            State::Sending | State::Retrying => {
                let body = serde_json::to_string(&payload)?;
                let response = session.put(&url, body).await?;
                if response.is_success() {
                    State::Done(response.status)
                } else if response.status == 400 && patch_context.is_some() && !retried {
                    State::Failed(response.error_messages())
                } else {
                    return Err(into_error(response));
                }
            }
            State::Failed(errors) => {
                tracing::error!(?errors, "update rejected");
                let Some(ctx) = patch_context.as_ref() else {
                    return Err(JiraError::Validation { messages: errors });
                };
                let plan = plan(&errors, &mut payload, ctx);
                if plan.is_actionable() {
                    State::Patched {
                        missing_user: plan.missing_user,
                    }
                } else {
                    State::GaveUp(errors)
                }
            }
            State::Patched { missing_user } => {
                if let Some(user) = missing_user {
                    create_missing_user(accounts.as_deref(), &user).await?;
                }
                retried = true;
                State::Retrying
            }
            State::GaveUp(errors) => {
                tracing::warn!("autofix: no recognized validation message, giving up");
                return Err(JiraError::Validation { messages: errors });
            }
            State::Done(status) => return Ok(status),
        };
    }
}

async fn create_missing_user(accounts: Option<&dyn AccountManager>, user: &str) -> Result<()> {
    match accounts {
        Some(accounts) => {
            tracing::warn!(
                user,
                "Trying to add missing orphan user in order to complete the previous failed operation"
            );
            accounts
                .create_account(user, PLACEHOLDER_EMAIL, DEFAULT_GROUP_ID, false)
                .await
        }
        None => {
            tracing::warn!(user, "autofix: user is missing but no account manager was given");
            Ok(())
        }
    }
}

fn into_error(response: RawResponse) -> JiraError {
    let status = response.status;
    match response.error_for_status() {
        Err(e) => e,
        Ok(_) => JiraError::ApiError {
            message: format!("unexpected status {status}"),
            status_code: Some(status),
        },
    }
}

fn fields_mut(payload: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    payload
        .entry("fields")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

fn set_account_field(payload: &mut Map<String, Value>, field: &str, account: &str) -> bool {
    match fields_mut(payload) {
        Some(fields) if !fields.contains_key(field) => {
            tracing::warn!("autofix: setting {field} to '{account}' and retrying the update");
            fields.insert(field.to_string(), json!({ "name": account }));
            true
        }
        _ => false,
    }
}

fn set_reporter(payload: &mut Map<String, Value>, ctx: &PatchContext) -> bool {
    set_account_field(payload, "reporter", &ctx.account)
}

fn set_assignee(payload: &mut Map<String, Value>, ctx: &PatchContext) -> bool {
    set_account_field(payload, "assignee", &ctx.account)
}

fn convert_subtask(payload: &mut Map<String, Value>, _ctx: &PatchContext) -> bool {
    let Some(fields) = fields_mut(payload) else {
        return false;
    };
    tracing::warn!("autofix: converting sub-task without parent to Bug");
    fields.insert("issuetype".to_string(), json!({ "name": "Bug" }));
    true
}

fn strip_summary_newlines(payload: &mut Map<String, Value>, ctx: &PatchContext) -> bool {
    let Some(fields) = fields_mut(payload) else {
        return false;
    };
    let summary = fields
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| ctx.current_summary.clone());
    let Some(summary) = summary else {
        return false;
    };

    tracing::warn!("autofix: removing newlines from summary");
    let stripped = summary.replace("\r\n", "").replace(['\n', '\r'], "");
    fields.insert("summary".to_string(), Value::String(stripped));
    true
}
