//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use tabled::{Table, Tabled};

use crate::resource::{Resource, Value};

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

/// One attribute row of a resource table.
#[derive(Tabled)]
pub struct AttributeRow {
    pub attribute: String,
    pub value: String,
}

impl PrettyPrint for Resource {
    fn pretty_print(&self) -> String {
        let header = format!("{}: {}", self.kind(), self.label());
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider];
        if let Ok(url) = self.self_url() {
            lines.push(format!("URL:            {}", url));
        }

        let rows = attribute_rows(self);
        if !rows.is_empty() {
            lines.push(Table::new(rows).to_string());
        }

        lines.join("\n")
    }
}

/// Top-level attributes rendered as short strings.
pub fn attribute_rows(resource: &Resource) -> Vec<AttributeRow> {
    resource
        .attributes()
        .iter()
        .filter(|(name, _)| *name != "self")
        .map(|(name, value)| AttributeRow {
            attribute: name.to_string(),
            value: summarize(value),
        })
        .collect()
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::List(items) => format!("[{} items]", items.len()),
        Value::Holder(h) => format!("{{{} fields}}", h.len()),
        Value::TimeTracking(h) => h
            .get("remainingEstimate")
            .ok()
            .and_then(Value::as_str)
            .map(|est| format!("{est} remaining"))
            .unwrap_or_else(|| "{timetracking}".to_string()),
        Value::Resource(r) => format!("{} ({})", r.label(), r.kind()),
    }
}
