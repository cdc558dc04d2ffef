//! Recursive conversion of JSON payloads into the typed resource graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Map;

use super::entity::Resource;
use super::registry::Registry;
use super::value::{AttributeHolder, Value};
use crate::config::Options;
use crate::traits::Transport;

/// Key whose object value is always a time-tracking holder.
const TIMETRACKING_KEY: &str = "timetracking";

/// Materialize any JSON value.
///
/// Never fails: objects with a `self` link the registry does not know become
/// [`crate::resource::ResourceKind::Generic`] resources.
pub fn materialize(
    raw: &serde_json::Value,
    options: &Arc<Options>,
    session: &Arc<dyn Transport>,
) -> Value {
    Materializer { options, session }.value(None, raw)
}

/// Materialize the members of an object into an attribute table.
pub(crate) fn materialize_attributes(
    raw: &Map<String, serde_json::Value>,
    options: &Arc<Options>,
    session: &Arc<dyn Transport>,
) -> BTreeMap<String, Value> {
    Materializer { options, session }.attributes(raw)
}

struct Materializer<'a> {
    options: &'a Arc<Options>,
    session: &'a Arc<dyn Transport>,
}

impl Materializer<'_> {
    fn value(&self, key: Option<&str>, raw: &serde_json::Value) -> Value {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.clone()),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(|item| self.value(None, item)).collect())
            }
            serde_json::Value::Object(map) if key == Some(TIMETRACKING_KEY) => {
                Value::TimeTracking(AttributeHolder::time_tracking(self.attributes(map)))
            }
            serde_json::Value::Object(map) => match map.get("self") {
                Some(link) => {
                    let kind = Registry::builtin().resolve(link.as_str().unwrap_or_default());
                    Value::Resource(Box::new(Resource::from_raw(
                        kind,
                        Arc::clone(self.options),
                        Arc::clone(self.session),
                        raw.clone(),
                    )))
                }
                None => Value::Holder(AttributeHolder::new(self.attributes(map))),
            },
        }
    }

    fn attributes(&self, map: &Map<String, serde_json::Value>) -> BTreeMap<String, Value> {
        map.iter()
            .map(|(k, v)| (k.clone(), self.value(Some(k), v)))
            .collect()
    }
}
