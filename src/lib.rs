//! # sdlang
//!
//! A reader and writer for SDL, the Simple Declarative Language.
//!
//! ## What is SDL?
//!
//! SDL describes trees of tags. Each tag has an optional namespace, a name,
//! a list of typed values, a set of typed attributes, and child tags in a
//! brace-delimited body:
//!
//! ```text
//! // a comment
//! server "alpha" port=8080 started=2024/03/01 09:30:00-GMT+01:00 {
//!     path "/static" cache=5d:00:00:00
//!     key [c2VjcmV0]
//! }
//! 1 2 3  # an anonymous tag: no name, just values
//! ```
//!
//! ## Key Features
//!
//! - **Typed literals**: strings, characters, 32/64-bit integers, arbitrary
//!   precision decimals, floats, dates, date-times with zones, time spans,
//!   base64 binary and `null`
//! - **Tree and pull APIs**: [`from_str`] builds a [`Tag`] tree, [`Reader`]
//!   streams [`Event`]s
//! - **Round trip**: [`to_string`] writes text that reads back to an equal tree
//! - **Precise errors**: every parse error carries its line, column and
//!   source line
//!
//! ## Quick Start
//!
//! ```rust
//! use sdlang::{from_str, to_string, Value};
//!
//! let root = from_str("person \"Akiko\" age=31 {\n\tpet \"cat\"\n}\n").unwrap();
//!
//! let person = root.child("person").unwrap();
//! assert_eq!(person.value(), Some(&Value::from("Akiko")));
//! assert_eq!(person.attribute("age"), Some(&Value::Int32(31)));
//! assert_eq!(person.child("pet").and_then(|t| t.value()), Some(&Value::from("cat")));
//!
//! assert_eq!(to_string(&root).unwrap(), "person \"Akiko\" age=31 {\n\tpet \"cat\"\n}\n");
//! ```
//!
//! ### Building trees
//!
//! ```rust
//! use sdlang::{tag, to_string};
//!
//! let config = tag!("config" => [
//!     tag!("size", 640, 480),
//!     tag!("title", "demo"; "lang" = "en"),
//! ])
//! .unwrap();
//!
//! assert_eq!(
//!     to_string(&config).unwrap(),
//!     "config {\n\tsize 640 480\n\ttitle \"demo\" lang=\"en\"\n}\n"
//! );
//! ```
//!
//! ### Single values
//!
//! ```rust
//! use sdlang::{to_attribute_map, to_value, to_value_array, TimeSpan, Value};
//!
//! assert_eq!(to_value("12:24:01").unwrap(), Value::TimeSpan(TimeSpan::new(0, 12, 24, 1, 0)));
//! assert_eq!(to_value_array("1 2L 3.5F").unwrap(), vec![Value::Int32(1), Value::Int64(2), Value::Float32(3.5)]);
//! assert_eq!(to_attribute_map("a=true").unwrap().get("a"), Some(&Value::Bool(true)));
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: element starts and ends at `debug`,
//! every token at `trace`. Install any subscriber to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Parse a document, walk it, write it back
//! - **`build_tags.rs`** - Assemble trees with the API and the `tag!` macro
//! - **`pull_reader.rs`** - Stream events without building a tree
//! - **`custom_options.rs`** - Indentation, line endings and quotes
//! - **`trace_tokens.rs`** - Watch the tokenizer through `tracing`
//!
//! Run any of them with: `cargo run --example <name>`

pub mod error;
pub mod literal;
#[doc(hidden)]
pub mod macros;
pub mod map;
pub mod options;
pub mod reader;
pub mod ser;
pub mod tag;
pub mod timespan;
pub mod token;
pub mod tokenizer;
pub mod value;
pub mod writer;
pub mod zone;

pub use error::{Error, Result};
pub use map::{Attributes, QualifiedName};
pub use options::{Quote, WriterOptions};
pub use reader::{Element, Event, Reader};
pub use ser::{coerce, is_coercible};
pub use tag::{is_valid_identifier, validate_identifier, Tag};
pub use timespan::TimeSpan;
pub use value::Value;
pub use writer::{ElementWriter, TagBuilder, Writer};
pub use zone::{FixedZoneResolver, ZoneResolver};

use std::io;
use tracing::debug;

/// Parses an SDL document into a root tag holding the top-level tags.
///
/// # Examples
///
/// ```rust
/// use sdlang::from_str;
///
/// let root = from_str("a 1\nb 2").unwrap();
/// assert!(root.is_root());
/// assert_eq!(root.child_count(), 2);
/// ```
///
/// # Errors
///
/// Returns the first lexical, syntax or literal error, with its line and
/// column.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Tag> {
    debug!(bytes = s.len(), "parsing document");
    Reader::from_str(s).read_tag()
}

/// Parses an SDL document from UTF-8 bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or not valid SDL.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<Tag> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Parses an SDL document from an I/O stream, one line at a time.
///
/// # Examples
///
/// ```rust
/// use sdlang::from_reader;
/// use std::io::Cursor;
///
/// let root = from_reader(Cursor::new(b"size 10 20")).unwrap();
/// assert_eq!(root.children()[0].values().len(), 2);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the input is not valid SDL.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(reader: R) -> Result<Tag> {
    Reader::new(io::BufReader::new(reader)).read_tag()
}

/// Writes a tag as SDL text with default options.
///
/// A root tag is written as its children; any other tag is written with its
/// body.
///
/// # Errors
///
/// Returns a usage error for a root tag carrying values or attributes, and
/// for values without a literal form (non-finite floats).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(tag: &Tag) -> Result<String> {
    to_string_with_options(tag, WriterOptions::default())
}

/// Writes a tag as SDL text with custom options.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(tag: &Tag, options: WriterOptions) -> Result<String> {
    let mut buffer = Vec::new();
    to_writer_with_options(&mut buffer, tag, options)?;
    String::from_utf8(buffer).map_err(|e| Error::custom(e.to_string()))
}

/// Writes a tag as SDL text to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use sdlang::{to_writer, Tag};
///
/// let mut tag = Tag::new("greeting").unwrap();
/// tag.add_value("hi");
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &tag).unwrap();
/// assert_eq!(buffer, b"greeting \"hi\"\n");
/// ```
///
/// # Errors
///
/// See [`to_string`]; I/O failures are reported as [`Error::Io`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write>(writer: W, tag: &Tag) -> Result<()> {
    to_writer_with_options(writer, tag, WriterOptions::default())
}

/// Writes a tag as SDL text to an I/O stream with custom options.
///
/// # Errors
///
/// See [`to_writer`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W: io::Write>(writer: W, tag: &Tag, options: WriterOptions) -> Result<()> {
    let mut writer = Writer::with_options(writer, options);
    if tag.is_root() {
        if !tag.values().is_empty() || !tag.attributes().is_empty() {
            return Err(Error::usage("the root tag cannot carry values or attributes"));
        }
        debug!(tags = tag.child_count(), "writing document");
        for child in tag.children() {
            writer.write_tag(child)?;
        }
    } else {
        debug!(name = %tag.name(), "writing tag");
        writer.write_tag(tag)?;
    }
    writer.flush()
}

/// Reads the first value of the first tag in `s`.
///
/// # Examples
///
/// ```rust
/// use sdlang::{to_value, Value};
///
/// assert_eq!(to_value("\"text\"").unwrap(), Value::from("text"));
/// assert_eq!(to_value("2005/12/05").unwrap().as_date().map(|d| d.to_string()), Some("2005-12-05".to_string()));
/// ```
///
/// # Errors
///
/// Returns parse errors, and a usage error when there is no tag or the
/// first tag has no value.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value(s: &str) -> Result<Value> {
    let mut values = to_value_array(s)?;
    if values.is_empty() {
        return Err(Error::usage("the first tag has no value"));
    }
    Ok(values.swap_remove(0))
}

/// Reads the values of the first tag in `s`.
///
/// # Errors
///
/// Returns parse errors, and a usage error when `s` holds no tag.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value_array(s: &str) -> Result<Vec<Value>> {
    let root = from_str(s)?;
    root.children()
        .first()
        .map(|tag| tag.values().to_vec())
        .ok_or_else(|| Error::usage("no tag in input"))
}

/// Reads `s` as the attribute list of a tag: `name=value ...`.
///
/// # Errors
///
/// Returns parse errors, and a usage error if `s` holds anything but
/// attributes on a single line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_attribute_map(s: &str) -> Result<Attributes> {
    let mut root = from_str(&format!("atts {}", s))?;
    match root.remove_child(0) {
        Some(tag) if root.child_count() == 0 && tag.values().is_empty() && !tag.has_children() => {
            Ok(tag.attributes().clone())
        }
        _ => Err(Error::usage(format!("not an attribute list: '{}'", s))),
    }
}
