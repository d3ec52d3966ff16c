//! Attribute maps keyed by qualified name.
//!
//! This module provides [`Attributes`], a wrapper around [`IndexMap`] keyed by
//! [`QualifiedName`]. Insertion order is kept for iteration; writers use
//! [`Attributes::sorted`] for deterministic output.
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{Attributes, Value};
//!
//! let mut attrs = Attributes::new();
//! attrs.insert("", "name", Value::from("Alice"));
//! attrs.insert("xml", "lang", Value::from("en"));
//!
//! assert_eq!(attrs.len(), 2);
//! assert_eq!(attrs.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(attrs.get_ns("xml", "lang").and_then(|v| v.as_str()), Some("en"));
//! assert!(attrs.get("lang").is_none());
//! ```

use crate::Value;
use indexmap::{Equivalent, IndexMap};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A namespace and a local name. The empty namespace is the default one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct QualifiedName {
    pub namespace: String,
    pub name: String,
}

impl QualifiedName {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        QualifiedName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

/// Borrowed form of [`QualifiedName`] for lookups without allocation.
/// Field order must match `QualifiedName` so that both hash alike.
#[derive(Hash)]
struct QualifiedNameRef<'a> {
    namespace: &'a str,
    name: &'a str,
}

impl Equivalent<QualifiedName> for QualifiedNameRef<'_> {
    fn equivalent(&self, key: &QualifiedName) -> bool {
        self.namespace == key.namespace && self.name == key.name
    }
}

/// The attributes of a tag, unique per qualified name.
///
/// Equality ignores order.
///
/// # Examples
///
/// ```rust
/// use sdlang::{Attributes, Value};
///
/// let mut attrs = Attributes::new();
/// attrs.insert("", "zeta", Value::from(1));
/// attrs.insert("", "alpha", Value::from(2));
///
/// // Iteration keeps insertion order, `sorted` orders by namespace then name
/// let names: Vec<_> = attrs.iter().map(|(k, _)| k.name.as_str()).collect();
/// assert_eq!(names, vec!["zeta", "alpha"]);
/// let names: Vec<_> = attrs.sorted().into_iter().map(|(k, _)| k.name.as_str()).collect();
/// assert_eq!(names, vec!["alpha", "zeta"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(IndexMap<QualifiedName, Value>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Attributes(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Attributes(IndexMap::with_capacity(capacity))
    }

    /// Sets an attribute, returning the value it replaced.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: Value,
    ) -> Option<Value> {
        self.0.insert(QualifiedName::new(namespace, name), value)
    }

    /// Looks up an attribute in the default namespace.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_ns("", name)
    }

    #[must_use]
    pub fn get_ns(&self, namespace: &str, name: &str) -> Option<&Value> {
        self.0.get(&QualifiedNameRef { namespace, name })
    }

    #[must_use]
    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.0.contains_key(&QualifiedNameRef { namespace, name })
    }

    /// Removes an attribute, keeping the order of the others.
    pub fn remove(&mut self, namespace: &str, name: &str) -> Option<Value> {
        self.0.shift_remove(&QualifiedNameRef { namespace, name })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &Value)> {
        self.0.iter()
    }

    /// Iterates over the attributes of one namespace.
    pub fn in_namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.0
            .iter()
            .filter(move |(key, _)| key.namespace == namespace)
            .map(|(key, value)| (key.name.as_str(), value))
    }

    /// Returns the entries ordered by namespace, then name.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&QualifiedName, &Value)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl IntoIterator for Attributes {
    type Item = (QualifiedName, Value);
    type IntoIter = indexmap::map::IntoIter<QualifiedName, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a QualifiedName, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, QualifiedName, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(QualifiedName, Value)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (QualifiedName, Value)>>(iter: T) -> Self {
        Attributes(iter.into_iter().collect())
    }
}

impl Extend<(QualifiedName, Value)> for Attributes {
    fn extend<T: IntoIterator<Item = (QualifiedName, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// Serializes as a map from `ns:name` (or `name`) to value, in sorted order.
impl Serialize for Attributes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.sorted() {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_distinct() {
        let mut attrs = Attributes::new();
        attrs.insert("", "id", Value::from(1));
        attrs.insert("a", "id", Value::from(2));
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("id"), Some(&Value::Int32(1)));
        assert_eq!(attrs.get_ns("a", "id"), Some(&Value::Int32(2)));
        assert!(!attrs.contains("b", "id"));
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut attrs = Attributes::new();
        assert!(attrs.insert("", "k", Value::from(1)).is_none());
        assert_eq!(attrs.insert("", "k", Value::from(2)), Some(Value::Int32(1)));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut attrs: Attributes = ["c", "a", "b"]
            .iter()
            .map(|n| (QualifiedName::new("", *n), Value::Null))
            .collect();
        assert_eq!(attrs.remove("", "a"), Some(Value::Null));
        let names: Vec<_> = attrs.iter().map(|(k, _)| k.name.clone()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_sorted_by_namespace_then_name() {
        let mut attrs = Attributes::new();
        attrs.insert("z", "a", Value::Null);
        attrs.insert("", "b", Value::Null);
        attrs.insert("", "a", Value::Null);
        let keys: Vec<_> = attrs.sorted().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b", "z:a"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = Attributes::new();
        a.insert("", "x", Value::from(1));
        a.insert("", "y", Value::from(2));
        let mut b = Attributes::new();
        b.insert("", "y", Value::from(2));
        b.insert("", "x", Value::from(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_in_namespace() {
        let mut attrs = Attributes::new();
        attrs.insert("ns", "a", Value::from(1));
        attrs.insert("", "b", Value::from(2));
        attrs.insert("ns", "c", Value::from(3));
        let names: Vec<_> = attrs.in_namespace("ns").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_serialize_keys() {
        let mut attrs = Attributes::new();
        attrs.insert("xml", "lang", Value::from("en"));
        attrs.insert("", "id", Value::from(7));
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"id":7,"xml:lang":"en"}"#);
    }
}
