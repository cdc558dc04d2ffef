//! Materialized attribute values and the attribute holder.

use std::collections::BTreeMap;

use serde_json::Number;

use super::entity::Resource;
use crate::error::{JiraError, Result};

/// One materialized attribute.
///
/// Scalars keep their JSON type. Nested objects become a [`Resource`] when
/// they carry a `self` link, otherwise an [`AttributeHolder`].
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    /// Nested object without a `self` link.
    Holder(AttributeHolder),
    /// The `timetracking` sub-document of an issue.
    TimeTracking(AttributeHolder),
    Resource(Box<Resource>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The holder behind a [`Value::Holder`] or [`Value::TimeTracking`].
    pub fn as_holder(&self) -> Option<&AttributeHolder> {
        match self {
            Self::Holder(h) | Self::TimeTracking(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// Navigate into a nested holder or resource.
    ///
    /// # Errors
    ///
    /// [`JiraError::AttributeMissing`] if this value has no attribute `name`,
    /// including when it is a scalar or a list.
    pub fn attr(&self, name: &str) -> Result<&Value> {
        match self {
            Self::Holder(h) | Self::TimeTracking(h) => h.get(name),
            Self::Resource(r) => r.attr(name),
            other => Err(JiraError::AttributeMissing {
                kind: other.type_name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Follow `names` through nested attributes.
    pub fn path(&self, names: &[&str]) -> Result<&Value> {
        names.iter().try_fold(self, |value, name| value.attr(name))
    }

    /// Rebuild the JSON this value was materialized from.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => items.iter().map(Value::to_json).collect(),
            Self::Holder(h) | Self::TimeTracking(h) => h.to_json(),
            Self::Resource(r) => r.raw().cloned().unwrap_or(serde_json::Value::Null),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Holder(h) | Self::TimeTracking(h) => h.type_name(),
            Self::Resource(r) => r.kind().name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Holder(a), Self::Holder(b)) => a == b,
            (Self::TimeTracking(a), Self::TimeTracking(b)) => a == b,
            (Self::Resource(a), Self::Resource(b)) => {
                a.kind() == b.kind() && a.raw() == b.raw()
            }
            _ => false,
        }
    }
}

/// Non-addressable bag of attributes with no CRUD behavior.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeHolder {
    timetracking: bool,
    attrs: BTreeMap<String, Value>,
}

impl AttributeHolder {
    pub(crate) fn new(attrs: BTreeMap<String, Value>) -> Self {
        Self {
            timetracking: false,
            attrs,
        }
    }

    pub(crate) fn time_tracking(attrs: BTreeMap<String, Value>) -> Self {
        Self {
            timetracking: true,
            attrs,
        }
    }

    /// Look up an attribute.
    ///
    /// # Errors
    ///
    /// [`JiraError::AttributeMissing`] if the key was absent from the payload.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.attrs
            .get(name)
            .ok_or_else(|| JiraError::AttributeMissing {
                kind: self.type_name().to_string(),
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.attrs
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }

    fn type_name(&self) -> &'static str {
        if self.timetracking {
            "TimeTracking"
        } else {
            "PropertyHolder"
        }
    }
}
