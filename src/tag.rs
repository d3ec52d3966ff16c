//! The SDL document model.
//!
//! A [`Tag`] has an optional namespace, a name, an ordered list of values,
//! a map of attributes and an ordered list of children. A parsed document is
//! a synthetic root tag (named `root`) whose children are the top-level tags.
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{Tag, Value};
//!
//! let mut server = Tag::new("server").unwrap();
//! server.add_value("alpha");
//! server.set_attribute("port", 8080).unwrap();
//! server.new_child("mirror").unwrap().add_value("beta");
//!
//! assert_eq!(server.value(), Some(&Value::from("alpha")));
//! assert_eq!(server.attribute("port"), Some(&Value::Int32(8080)));
//! assert_eq!(server.to_string(), "server \"alpha\" port=8080 {\n\tmirror \"beta\"\n}\n");
//! ```

use crate::error::{Error, Result};
use crate::map::Attributes;
use crate::value::Value;
use crate::writer::{ElementWriter, Writer};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// The name given to tags written without one (`"hello"` alone on a line).
pub const ANONYMOUS_TAG_NAME: &str = "content";

/// The name of the synthetic tag holding a parsed document's top-level tags.
pub const ROOT_TAG_NAME: &str = "root";

/// Words the tokenizer reads as `Bool` or `Null` literals, never as names.
const KEYWORDS: [&str; 5] = ["true", "false", "on", "off", "null"];

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{Alphabetic}_][\p{Alphabetic}\p{Nd}_\-.$]*$").expect("identifier pattern must compile")
});

/// Returns `true` if `s` can be used as a tag, namespace or attribute name.
///
/// # Examples
///
/// ```rust
/// use sdlang::is_valid_identifier;
///
/// assert!(is_valid_identifier("my-tag_1.x$"));
/// assert!(is_valid_identifier("日本"));
/// assert!(!is_valid_identifier("1st"));
/// assert!(!is_valid_identifier(""));
/// assert!(!is_valid_identifier("null"));
/// assert!(is_valid_identifier("nullable"));
/// ```
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s) && !is_keyword(s)
}

pub(crate) fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// Checks `s` against the identifier grammar, describing the first problem.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] for an empty string, a keyword
/// (`true`, `false`, `on`, `off`, `null`), a bad first character or a bad
/// character further on.
pub fn validate_identifier(s: &str) -> Result<()> {
    if is_keyword(s) {
        return Err(Error::invalid_identifier(format!(
            "'{}' is a reserved SDL literal and cannot be used as an identifier.",
            s
        )));
    }
    if IDENTIFIER.is_match(s) {
        return Ok(());
    }

    let mut chars = s.chars();
    let first = match chars.next() {
        None => {
            return Err(Error::invalid_identifier(
                "SDL identifiers cannot be null or empty.",
            ))
        }
        Some(c) => c,
    };
    if !crate::tokenizer::is_identifier_start(first) {
        return Err(Error::invalid_identifier(format!(
            "'{}' is not a legal first character for an SDL identifier. \
             SDL identifiers must start with a unicode letter or an underscore (_).",
            first
        )));
    }
    let bad = chars
        .find(|c| !crate::tokenizer::is_identifier_part(*c))
        .unwrap_or(first);
    Err(Error::invalid_identifier(format!(
        "'{}' is not a legal character for an SDL identifier. \
         SDL identifiers can only contain unicode letters, digits, underscores (_), \
         dashes (-), periods (.) and dollar signs ($).",
        bad
    )))
}

/// An SDL tag.
///
/// Equality is structural: namespace, name, values in order, attributes
/// regardless of order, children in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    namespace: String,
    name: String,
    values: Vec<Value>,
    attributes: Attributes,
    children: Vec<Tag>,
}

impl Tag {
    /// Creates a tag in the default namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if `name` is not an identifier.
    pub fn new(name: impl Into<String>) -> Result<Tag> {
        Tag::with_namespace("", name)
    }

    /// Creates a tag in `namespace`, which may be empty.
    pub fn with_namespace(namespace: impl Into<String>, name: impl Into<String>) -> Result<Tag> {
        let namespace = namespace.into();
        let name = name.into();
        if !namespace.is_empty() {
            validate_identifier(&namespace)?;
        }
        validate_identifier(&name)?;
        Ok(Tag::new_unchecked(namespace, name))
    }

    /// Creates an anonymous tag, written with its values only.
    #[must_use]
    pub fn anonymous() -> Tag {
        Tag::new_unchecked(String::new(), ANONYMOUS_TAG_NAME.to_string())
    }

    /// Creates an empty document root.
    #[must_use]
    pub fn root() -> Tag {
        Tag::new_unchecked(String::new(), ROOT_TAG_NAME.to_string())
    }

    pub(crate) fn new_unchecked(namespace: String, name: String) -> Tag {
        Tag {
            namespace,
            name,
            values: Vec::new(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.namespace.is_empty() && self.name == ANONYMOUS_TAG_NAME
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.namespace.is_empty() && self.name == ROOT_TAG_NAME
    }

    // Values

    /// The first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Appends a value.
    pub fn add_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    /// Appends any host value that maps onto an SDL literal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCoercible`] naming the host type when `value` has
    /// no literal counterpart.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::{Error, Tag};
    ///
    /// let mut tag = Tag::new("t").unwrap();
    /// tag.try_add_value(&7u64).unwrap();
    /// assert!(matches!(tag.try_add_value(&vec![1, 2]), Err(Error::NotCoercible { .. })));
    /// ```
    pub fn try_add_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let value = crate::ser::coerce(value)?;
        self.values.push(value);
        Ok(self)
    }

    pub fn set_values(&mut self, values: Vec<Value>) -> &mut Self {
        self.values = values;
        self
    }

    pub fn clear_values(&mut self) -> &mut Self {
        self.values.clear();
        self
    }

    /// Removes the first value equal to `value`. Returns `true` if one was found.
    pub fn remove_value(&mut self, value: &Value) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }

    // Attributes

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Looks up an attribute in the default namespace.
    ///
    /// `None` means absent; a present null attribute is `Some(&Value::Null)`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&Value> {
        self.attributes.get_ns(namespace, name)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains("", name)
    }

    #[must_use]
    pub fn has_attribute_ns(&self, namespace: &str, name: &str) -> bool {
        self.attributes.contains(namespace, name)
    }

    /// Sets an attribute in the default namespace, replacing any previous value.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.set_attribute_ns("", name, value)
    }

    /// Sets an attribute, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if the name or the non-empty
    /// namespace is not an identifier.
    pub fn set_attribute_ns(
        &mut self,
        namespace: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        if !namespace.is_empty() {
            validate_identifier(namespace)?;
        }
        validate_identifier(name)?;
        self.attributes.insert(namespace, name, value.into());
        Ok(self)
    }

    pub(crate) fn set_attribute_unchecked(&mut self, namespace: String, name: String, value: Value) {
        self.attributes.insert(namespace, name, value);
    }

    pub fn remove_attribute(&mut self, namespace: &str, name: &str) -> Option<Value> {
        self.attributes.remove(namespace, name)
    }

    /// The attributes of one namespace, as `(name, value)` pairs.
    pub fn attributes_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.attributes.in_namespace(namespace)
    }

    pub fn clear_attributes(&mut self) -> &mut Self {
        self.attributes.clear();
        self
    }

    // Children

    #[must_use]
    pub fn children(&self) -> &[Tag] {
        &self.children
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Tag> {
        self.children.iter_mut()
    }

    /// Appends a child.
    pub fn add_child(&mut self, child: Tag) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Appends a new child named `name` and returns it.
    pub fn new_child(&mut self, name: &str) -> Result<&mut Tag> {
        let child = Tag::new(name)?;
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    /// Inserts a child at `index`.
    ///
    /// # Errors
    ///
    /// Returns a usage error if `index` is past the end.
    pub fn insert_child(&mut self, index: usize, child: Tag) -> Result<&mut Self> {
        if index > self.children.len() {
            return Err(Error::usage(format!(
                "child index {} out of range (0..={})",
                index,
                self.children.len()
            )));
        }
        self.children.insert(index, child);
        Ok(self)
    }

    /// Removes and returns the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<Tag> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn clear_children(&mut self) -> &mut Self {
        self.children.clear();
        self
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The first child named `name` in the default namespace.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Tag> {
        self.child_ns("", name)
    }

    #[must_use]
    pub fn child_ns(&self, namespace: &str, name: &str) -> Option<&Tag> {
        self.children
            .iter()
            .find(|c| c.namespace == namespace && c.name == name)
    }

    /// The children named `name`, in document order.
    ///
    /// `namespace` of `None` matches every namespace. With `recursive`, all
    /// descendants are searched depth-first, each tag before its own children.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::from_str;
    ///
    /// let root = from_str("item 1 {\n item 2\n}\nns:item 3\n").unwrap();
    /// assert_eq!(root.children_named(None, "item", false).len(), 2);
    /// assert_eq!(root.children_named(Some(""), "item", true).len(), 2);
    /// assert_eq!(root.children_named(None, "item", true).len(), 3);
    /// ```
    #[must_use]
    pub fn children_named(&self, namespace: Option<&str>, name: &str, recursive: bool) -> Vec<&Tag> {
        let mut found = Vec::new();
        self.collect_children(namespace, name, recursive, &mut found);
        found
    }

    fn collect_children<'a>(
        &'a self,
        namespace: Option<&str>,
        name: &str,
        recursive: bool,
        found: &mut Vec<&'a Tag>,
    ) {
        for child in &self.children {
            if child.name == name && namespace.map_or(true, |ns| child.namespace == ns) {
                found.push(child);
            }
            if recursive {
                child.collect_children(namespace, name, recursive, found);
            }
        }
    }

    /// The values of each child named `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::{from_str, Value};
    ///
    /// let root = from_str("color 1 2\ncolor 3\nsize 9\n").unwrap();
    /// let colors = root.children_values("color");
    /// assert_eq!(colors, vec![&[Value::Int32(1), Value::Int32(2)][..], &[Value::Int32(3)][..]]);
    /// ```
    #[must_use]
    pub fn children_values(&self, name: &str) -> Vec<&[Value]> {
        self.children
            .iter()
            .filter(|c| c.namespace.is_empty() && c.name == name)
            .map(|c| c.values.as_slice())
            .collect()
    }
}

/// Renders the canonical SDL text of the tag, or of a root's children.
///
/// Values without a literal (NaN, sub-millisecond date-times) make
/// formatting fail, and `ToString::to_string` panics on that. Use
/// [`crate::to_string`] for a `Result`, or add values through
/// [`Tag::try_add_value`], which refuses non-finite floats.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = Writer::new(Vec::new());
        let written = if self.is_root() && self.values.is_empty() && self.attributes.is_empty() {
            self.children.iter().try_for_each(|c| writer.write_tag(c))
        } else {
            writer.write_tag(self)
        };
        written.map_err(|_| fmt::Error)?;
        let text = String::from_utf8(writer.into_inner()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Tag", 5)?;
        state.serialize_field("namespace", &self.namespace)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("values", &self.values)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.serialize_field("children", &self.children)?;
        state.end()
    }
}
