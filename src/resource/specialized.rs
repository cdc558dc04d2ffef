//! Helpers that only make sense for particular kinds.

use serde_json::{json, Map, Value as Json};

use super::entity::Resource;
use super::kind::ResourceKind;
use super::value::Value;
use crate::error::{JiraError, Result};

impl Resource {
    /// Browsable (non-REST) URL of an issue: `{server}/browse/{key}`.
    pub fn permalink(&self) -> Result<String> {
        self.expect_kind(ResourceKind::Issue, "permalink")?;
        let key = self
            .attr("key")?
            .as_str()
            .ok_or_else(|| self.missing("key"))?;
        Ok(format!("{}/browse/{}", self.options().server, key))
    }

    /// Add `value` to a multi-value issue field (labels, multi-selects)
    /// without resetting the existing values.
    pub async fn add_field_value(&mut self, field: &str, value: impl Into<Json>) -> Result<()> {
        self.expect_kind(ResourceKind::Issue, "add_field_value")?;
        let mut update = Map::new();
        update.insert(field.to_string(), json!([{ "add": value.into() }]));
        let mut payload = Map::new();
        payload.insert("update".to_string(), Json::Object(update));
        self.send_payload(payload, None, None).await
    }

    /// Labels of a loaded issue.
    pub fn labels(&self) -> Result<Vec<&str>> {
        Ok(self
            .path(&["fields", "labels"])?
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .collect())
    }

    /// Whether the issue carries any of `labels`.
    pub fn has_label(&self, labels: &[&str]) -> Result<bool> {
        let current = self.labels()?;
        Ok(labels.iter().any(|label| current.contains(label)))
    }

    /// Whether the issue belongs to any of the named components.
    pub fn has_component(&self, components: &[&str]) -> Result<bool> {
        let names: Vec<&str> = self
            .path(&["fields", "components"])?
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(|c| c.attr("name").ok().and_then(Value::as_str))
            .collect();
        Ok(components.iter().any(|c| names.contains(c)))
    }

    /// Whether the issue's status is `Done`.
    pub fn is_resolved(&self) -> Result<bool> {
        let status = self.path(&["fields", "status", "name"])?;
        Ok(status.as_str() == Some("Done"))
    }

    /// Download the content of an attachment.
    pub async fn content(&self) -> Result<Vec<u8>> {
        self.expect_kind(ResourceKind::Attachment, "content")?;
        let url = self
            .attr("content")?
            .as_str()
            .ok_or_else(|| self.missing("content"))?;
        self.session().get_bytes(url).await
    }

    fn expect_kind(&self, kind: ResourceKind, operation: &str) -> Result<()> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(JiraError::UnsupportedOperation {
                kind: self.kind().name(),
                reason: format!("{operation} is only available on {kind}"),
            })
        }
    }
}
