//! The generic, URL-addressable resource.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value as Json;

use super::kind::{bind_positional, fill_template, ApiRoot, ResourceId, ResourceKind};
use super::materialize::materialize_attributes;
use super::value::{AttributeHolder, Value};
use crate::config::Options;
use crate::error::{JiraError, Result};
use crate::headers::CaseInsensitiveHeaders;
use crate::traits::Transport;

/// Payload keys most likely to hold a human-readable name, in priority order.
const READABLE_IDS: [&str; 10] = [
    "displayName",
    "key",
    "name",
    "filename",
    "value",
    "scope",
    "votes",
    "id",
    "mimeType",
    "closed",
];

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A URL-addressable resource of the Jira REST API.
///
/// Created empty from a kind, options and a shared session, then populated by
/// [`Resource::find`] or built directly from a payload with
/// [`Resource::from_raw`]. Nested objects in the payload are materialized into
/// further resources or [`AttributeHolder`]s.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use jira_resources::{JiraClient, Resource, ResourceKind, Transport};
///
/// # async fn example() -> jira_resources::Result<()> {
/// let client = JiraClient::from_env()?;
/// let options = Arc::clone(client.options());
/// let session: Arc<dyn Transport> = Arc::new(client);
///
/// let mut issue = Resource::new(ResourceKind::Issue, options, session);
/// issue.find("PROJ-1", &[]).await?;
/// println!("{}: {}", issue, issue.path(&["fields", "summary"])?.as_str().unwrap_or(""));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Resource {
    kind: ResourceKind,
    path_template: Cow<'static, str>,
    options: Arc<Options>,
    session: Arc<dyn Transport>,
    instance: u64,
    self_url: Option<String>,
    id: Option<String>,
    raw: Option<Json>,
    attrs: AttributeHolder,
}

impl Resource {
    /// An empty resource of `kind`.
    ///
    /// [`ResourceKind::Generic`] has no template; use [`Resource::generic`]
    /// to supply one.
    pub fn new(kind: ResourceKind, options: Arc<Options>, session: Arc<dyn Transport>) -> Self {
        let template = kind.path_template().unwrap_or_default();
        Self::with_template(kind, Cow::Borrowed(template), options, session)
    }

    /// An empty generic resource with a caller-supplied path template.
    pub fn generic(
        path_template: impl Into<String>,
        options: Arc<Options>,
        session: Arc<dyn Transport>,
    ) -> Self {
        Self::with_template(
            ResourceKind::Generic,
            Cow::Owned(path_template.into()),
            options,
            session,
        )
    }

    /// A resource of `kind` populated from `raw`.
    pub fn from_raw(
        kind: ResourceKind,
        options: Arc<Options>,
        session: Arc<dyn Transport>,
        raw: Json,
    ) -> Self {
        let mut resource = Self::new(kind, options, session);
        resource.parse_raw(raw);
        resource
    }

    fn with_template(
        kind: ResourceKind,
        path_template: Cow<'static, str>,
        options: Arc<Options>,
        session: Arc<dyn Transport>,
    ) -> Self {
        Self {
            kind,
            path_template,
            options,
            session,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            self_url: None,
            id: None,
            raw: None,
            attrs: AttributeHolder::default(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn options(&self) -> &Arc<Options> {
        &self.options
    }

    pub fn session(&self) -> &Arc<dyn Transport> {
        &self.session
    }

    /// The raw payload, or `None` before the resource is loaded.
    pub fn raw(&self) -> Option<&Json> {
        self.raw.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.raw.is_some()
    }

    /// The `id` field, as a string whether the server sent a string or a number.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Absolute URL of this resource.
    ///
    /// # Errors
    ///
    /// [`JiraError::NotLoaded`] before `find`, [`JiraError::AttributeMissing`]
    /// if the loaded payload carried no `self` link.
    pub fn self_url(&self) -> Result<&str> {
        match (&self.self_url, &self.raw) {
            (Some(url), _) => Ok(url),
            (None, None) => Err(self.not_loaded()),
            (None, Some(_)) => Err(self.missing("self")),
        }
    }

    /// Fetch the resource identified by `id` and load it into `self`.
    ///
    /// # Errors
    ///
    /// [`JiraError::InvalidId`] if `id` does not fill the path template,
    /// [`JiraError::Request`] on transport failure, [`JiraError::Decode`] if
    /// the body is not JSON, or the status error for a failed response.
    #[tracing::instrument(skip(self, id, params), fields(kind = %self.kind))]
    pub async fn find(
        &mut self,
        id: impl Into<ResourceId>,
        params: &[(String, String)],
    ) -> Result<()> {
        let id = id.into();
        let path = bind_positional(&self.path_template, &id).map_err(|reason| {
            JiraError::InvalidId {
                template: self.path_template.to_string(),
                reason,
            }
        })?;
        let url = format!("{}{}", self.api_base(), path);

        self.load(&url, &CaseInsensitiveHeaders::new(), params)
            .await
    }

    /// Reload from the current `self` URL.
    pub async fn refresh(&mut self) -> Result<()> {
        let url = self.self_url()?.to_string();
        self.load(&url, &CaseInsensitiveHeaders::new(), &[]).await
    }

    /// GET `url` with the default headers merged under `headers` and load the
    /// response into this resource.
    pub(crate) async fn load(
        &mut self,
        url: &str,
        headers: &CaseInsensitiveHeaders,
        params: &[(String, String)],
    ) -> Result<()> {
        let headers = self.options.headers.merged(headers);
        let response = self.session.get(url, &headers, params).await?;
        let raw = response.json()?;

        self.self_url = Some(url.to_string());
        self.parse_raw(raw);
        Ok(())
    }

    /// Replace the payload and rebuild every attribute from it.
    pub(crate) fn parse_raw(&mut self, raw: Json) {
        self.attrs = match &raw {
            Json::Object(map) => AttributeHolder::new(materialize_attributes(
                map,
                &self.options,
                &self.session,
            )),
            _ => AttributeHolder::default(),
        };

        self.id = match raw.get("id") {
            Some(Json::String(s)) => Some(s.clone()),
            Some(Json::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        if let Some(link) = raw.get("self").and_then(Json::as_str) {
            self.self_url = Some(link.to_string());
        } else if self.kind.api_root() == ApiRoot::GreenHopper {
            if let Ok(path) = fill_template(&self.path_template, |name| {
                raw.get(name).map(|v| match v {
                    Json::String(s) => s.clone(),
                    other => other.to_string(),
                })
            }) {
                self.self_url = Some(format!("{}{}", self.options.greenhopper_base(), path));
            }
        }

        self.raw = Some(raw);
    }

    /// Look up a materialized attribute.
    ///
    /// # Errors
    ///
    /// [`JiraError::NotLoaded`] before any payload was loaded,
    /// [`JiraError::AttributeMissing`] if the payload has no such key. A key
    /// present with a `null` value returns [`Value::Null`].
    pub fn attr(&self, name: &str) -> Result<&Value> {
        if self.raw.is_none() {
            return Err(self.not_loaded());
        }
        self.attrs.get(name).map_err(|_| self.missing(name))
    }

    /// Follow `names` through nested attributes.
    pub fn path(&self, names: &[&str]) -> Result<&Value> {
        let (first, rest) = names
            .split_first()
            .ok_or_else(|| self.missing(""))?;
        self.attr(first)?.path(rest)
    }

    /// All materialized attributes.
    pub fn attributes(&self) -> &AttributeHolder {
        &self.attrs
    }

    /// Human-readable label: the first readable id present in the payload,
    /// followed by ` - <child>` when the resource has a `child` attribute.
    /// Falls back to the structural representation.
    pub fn label(&self) -> String {
        let Some(Json::Object(raw)) = &self.raw else {
            return self.repr();
        };

        for name in READABLE_IDS {
            if let Some(value) = raw.get(name) {
                let mut label = json_text(value);
                if let Ok(child) = self.attrs.get("child") {
                    label.push_str(" - ");
                    label.push_str(&value_label(child));
                }
                return label;
            }
        }
        self.repr()
    }

    /// Structural representation listing every readable id present.
    pub fn repr(&self) -> String {
        let names: Vec<String> = match &self.raw {
            Some(Json::Object(raw)) => READABLE_IDS
                .iter()
                .filter_map(|name| raw.get(*name).map(|v| format!("{name}={v}")))
                .collect(),
            _ => Vec::new(),
        };

        if names.is_empty() {
            format!("<JIRA {} at {:#x}>", self.kind.name(), self.instance)
        } else {
            format!("<JIRA {}: {}>", self.kind.name(), names.join(", "))
        }
    }

    /// Compare identity by `id`.
    ///
    /// Resources of different kinds are never equal.
    ///
    /// # Errors
    ///
    /// [`JiraError::IdentityUnavailable`] if either side of a same-kind
    /// comparison has no `id`.
    pub fn identity_eq(&self, other: &Resource) -> Result<bool> {
        if self.kind != other.kind {
            return Ok(false);
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => Ok(a == b),
            _ => Err(JiraError::IdentityUnavailable {
                kind: self.kind.name(),
            }),
        }
    }

    pub(crate) fn api_base(&self) -> String {
        match self.kind.api_root() {
            ApiRoot::Core => self.options.rest_base(),
            ApiRoot::GreenHopper => self.options.greenhopper_base(),
        }
    }

    pub(crate) fn not_loaded(&self) -> JiraError {
        JiraError::NotLoaded {
            kind: self.kind.name(),
        }
    }

    pub(crate) fn missing(&self, name: &str) -> JiraError {
        JiraError::AttributeMissing {
            kind: self.kind.name().to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

fn json_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_label(value: &Value) -> String {
    match value {
        Value::Resource(r) => r.label(),
        other => json_text(&other.to_json()),
    }
}
