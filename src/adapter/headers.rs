//! Header normalization between wire and application naming conventions.
//!
//! # Responsibilities
//! - Map wire header names to the application convention (`HTTP_`-prefixed,
//!   upper-cased, `-` → `_`) and back
//! - Carry `content-type` / `content-length` under their own unprefixed names
//! - Store headers with case-insensitive lookup while preserving the
//!   original casing of the last-seen name

/// Prefix applied to header-derived application names so they cannot
/// collide with other request fields.
pub const APPLICATION_PREFIX: &str = "HTTP_";

/// Headers carried under their own dedicated application names.
const UNPREFIXED: [&str; 2] = ["CONTENT_TYPE", "CONTENT_LENGTH"];

/// Convert a wire header name to the application convention.
///
/// `Content-Type` becomes `CONTENT_TYPE`, everything else gains the
/// `HTTP_` prefix: `X-Forwarded-Proto` becomes `HTTP_X_FORWARDED_PROTO`.
pub fn to_application_name(wire_name: &str) -> String {
    let upper: String = wire_name
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect();
    if UNPREFIXED.contains(&upper.as_str()) {
        upper
    } else {
        format!("{APPLICATION_PREFIX}{upper}")
    }
}

/// Convert an application header name back to its wire form.
///
/// Inverse of [`to_application_name`]; the wire name comes back
/// lower-cased (`HTTP_X_FORWARDED_PROTO` → `x-forwarded-proto`).
pub fn to_wire_name(application_name: &str) -> String {
    let bare = application_name
        .strip_prefix(APPLICATION_PREFIX)
        .unwrap_or(application_name);
    bare.chars()
        .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Ordered header map with case-insensitive name comparison.
///
/// One value per name, last write wins. The original casing of the
/// last-seen name is kept for diagnostics; lookups fold case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any existing value under a
    /// case-insensitively equal name. The stored name takes the casing
    /// of this call.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header value, folding case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Look up a header value, falling back to a default when absent.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterate entries in insertion order with their stored casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}
