/*
 * Responsibility
 * - 大文字小文字を区別しない multi-value header map
 * - identity header 名 (下流との契約なので変更は breaking change)
 *
 * Envoy sends pseudo headers (`:path`, `:authority`) which `http::HeaderName`
 * rejects, so this is a plain string map instead of `axum::http::HeaderMap`.
 */
use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub const REQUEST_USER_ID: &str = "Request-User-Id";
pub const REQUEST_USER_ROLE: &str = "Request-User-Role";
pub const REQUEST_USER_AUTHORITIES: &str = "Request-User-Authorities";
pub const REQUEST_ID: &str = "Request-Id";

/// Ordered header multimap with case-insensitive lookups.
///
/// - names keep the casing they were first inserted with
/// - values keep insertion order
/// - `index` maps the ASCII-lowercased name to its slot in `entries`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, merging into an existing entry with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.index.entry(name.to_ascii_lowercase()) {
            Entry::Occupied(slot) => self.entries[*slot.get()].1.push(value),
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push((name, vec![value]));
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.slot(name)
            .map(|i| self.entries[i].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot(&self, name: &str) -> Option<usize> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.index.get(&name.to_ascii_lowercase()).copied()
        } else {
            self.index.get(name).copied()
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case() {
        let headers: Headers = [("authorization", "Bearer abc")].into_iter().collect();

        assert!(headers.contains("Authorization"));
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer abc"));
        assert_eq!(headers.get("cookie"), None);
        assert!(headers.get_all("cookie").is_empty());
    }

    #[test]
    fn append_merges_values_under_first_seen_name() {
        let mut headers = Headers::new();
        headers.append("X-Trace", "a");
        headers.append("x-trace", "b");
        headers.append("Other", "c");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_all("X-TRACE"), ["a", "b"]);

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["X-Trace", "Other"]);
    }

    #[test]
    fn many_distinct_names_stay_addressable() {
        let headers: Headers = (0..20_000)
            .map(|i| (format!("X-Header-{i}"), i.to_string()))
            .collect();

        assert_eq!(headers.len(), 20_000);
        assert_eq!(headers.get("x-header-19999"), Some("19999"));
        assert_eq!(headers.iter().next().map(|(name, _)| name), Some("X-Header-0"));
    }
}
