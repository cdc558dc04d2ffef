//! Case-insensitive header map used when composing request headers.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// A header map whose lookups ignore ASCII case.
///
/// The map remembers the spelling of the most recent insert for each key, so
/// iteration yields the caller's casing while `get("ACCEPT")` and
/// `get("accept")` resolve to the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseInsensitiveHeaders {
    entries: BTreeMap<String, (String, String)>,
}

impl CaseInsensitiveHeaders {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The headers every Jira REST request carries by default.
    pub fn json_defaults() -> Self {
        let mut headers = Self::new();
        headers.insert("Cache-Control", "no-cache");
        headers.insert("Content-Type", "application/json");
        headers.insert("Accept", "application/json,*.*;q=0.9");
        headers
    }

    /// Insert a header, replacing any entry whose name differs only in case.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()))
            .map(|(_, old)| old)
    }

    /// Look up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if a header with this name is present, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Remove a header by name, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs using the last-inserted spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Merge `other` over `self`; entries from `other` win.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }

    /// Convert into a reqwest header map, skipping names or values that are
    /// not valid HTTP tokens.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in self.iter() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => tracing::warn!(header = name, "Skipping invalid header"),
            }
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CaseInsensitiveHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut headers = CaseInsensitiveHeaders::new();
        headers.insert("Accept", "application/json");

        assert_eq!(headers.get("aCCEPT"), Some("application/json"));
        assert!(headers.contains("accept"));
    }

    #[test]
    fn test_insert_replaces_and_keeps_latest_spelling() {
        let mut headers = CaseInsensitiveHeaders::new();
        headers.insert("content-type", "text/plain");
        let old = headers.insert("Content-Type", "application/json");

        assert_eq!(old.as_deref(), Some("text/plain"));
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("Content-Type", "application/json")]
        );
    }

    #[test]
    fn test_merged_prefers_other() {
        let defaults = CaseInsensitiveHeaders::json_defaults();
        let user: CaseInsensitiveHeaders = [("accept", "text/html")].into_iter().collect();

        let merged = defaults.merged(&user);
        assert_eq!(merged.get("Accept"), Some("text/html"));
        assert_eq!(merged.get("cache-control"), Some("no-cache"));
    }

    #[test]
    fn test_to_header_map() {
        let map = CaseInsensitiveHeaders::json_defaults().to_header_map();
        assert_eq!(map.get("content-type").unwrap(), "application/json");
    }
}
