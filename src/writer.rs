//! Writing SDL, as text or as a tag tree.
//!
//! [`ElementWriter`] is the imperative writing protocol: open an element,
//! give it values, then attributes, then children, then close it. It has two
//! implementations:
//!
//! - [`Writer`] renders canonical SDL text to any [`io::Write`]
//! - [`TagBuilder`] builds an in-memory [`Tag`] tree
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{ElementWriter, Value, Writer};
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.element("", "person", |w| {
//!     w.value(&Value::from("Akiko"))?;
//!     w.attribute("", "age", &Value::from(28))?;
//!     w.element("", "pet", |w| w.value(&Value::from("cat")))
//! }).unwrap();
//!
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(text, "person \"Akiko\" age=28 {\n\tpet \"cat\"\n}\n");
//! ```

use crate::error::{Error, Result};
use crate::options::{Quote, WriterOptions};
use crate::tag::{is_keyword, Tag, ANONYMOUS_TAG_NAME};
use crate::value::{escape_string, Value};
use base64::{engine::general_purpose, Engine as _};
use chrono::Timelike;
use std::io;

/// Encoded binary literals longer than this are wrapped over several lines.
const BASE64_WRAP_LINE_LENGTH: usize = 72;

/// The writing protocol shared by [`Writer`] and [`TagBuilder`].
///
/// For each element, every [`value`](ElementWriter::value) call must come
/// before the first [`attribute`](ElementWriter::attribute) call; breaking
/// that order is a usage error. A value given outside of any element opens
/// an anonymous element, which the caller closes with
/// [`end_element`](ElementWriter::end_element).
pub trait ElementWriter {
    /// Opens an element. An empty name (or `content` without namespace)
    /// opens an anonymous element.
    fn start_element(&mut self, namespace: &str, name: &str) -> Result<()>;

    /// Closes the innermost open element, and its body if it has one.
    fn end_element(&mut self) -> Result<()>;

    fn value(&mut self, value: &Value) -> Result<()>;

    fn attribute(&mut self, namespace: &str, name: &str, value: &Value) -> Result<()>;

    /// Opens an element, runs `body` on it, then closes it.
    fn element<F>(&mut self, namespace: &str, name: &str, body: F) -> Result<()>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.start_element(namespace, name)?;
        body(self)?;
        self.end_element()
    }

    fn values<'a, I>(&mut self, values: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = &'a Value>,
    {
        for value in values {
            self.value(value)?;
        }
        Ok(())
    }

    /// Writes a whole tag: values, then attributes ordered by namespace and
    /// name, then children.
    fn write_tag(&mut self, tag: &Tag) -> Result<()>
    where
        Self: Sized,
    {
        self.start_element(tag.namespace(), tag.name())?;
        self.values(tag.values())?;
        for (key, value) in tag.attributes().sorted() {
            self.attribute(&key.namespace, &key.name, value)?;
        }
        for child in tag.children() {
            self.write_tag(child)?;
        }
        self.end_element()
    }
}

fn is_anonymous(namespace: &str, name: &str) -> bool {
    namespace.is_empty() && (name.is_empty() || name == ANONYMOUS_TAG_NAME)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// Root level, nothing open
    Top,
    /// Inside a body, between children
    Body,
    /// Anonymous element opened, nothing written for it yet
    Anonymous,
    /// After the name or a value
    Values,
    /// After an attribute
    Attributes,
}

/// Forward-only SDL text writer.
///
/// Names are written as given: identifier validity is the caller's concern
/// ([`Tag`] validates on construction). Keyword names and values without a
/// faithful literal are refused with a usage error before anything is
/// written.
///
/// # Examples
///
/// ```rust
/// use sdlang::{ElementWriter, Value, Writer};
///
/// let mut writer = Writer::new(Vec::new());
/// writer.start_element("", "size").unwrap();
/// writer.value(&Value::from(2)).unwrap();
/// writer.value(&Value::from(3)).unwrap();
/// writer.end_element().unwrap();
///
/// // values outside of an element open an anonymous one
/// writer.value(&Value::from("loose")).unwrap();
/// writer.end_element().unwrap();
///
/// let text = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(text, "size 2 3\n\"loose\"\n");
/// ```
pub struct Writer<W> {
    out: W,
    options: WriterOptions,
    depth: usize,
    status: Status,
    last_value_was_date: bool,
}

impl<W: io::Write> Writer<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self::with_options(out, WriterOptions::default())
    }

    #[must_use]
    pub fn with_options(out: W, options: WriterOptions) -> Self {
        Writer {
            out,
            options,
            depth: 0,
            status: Status::Top,
            last_value_was_date: false,
        }
    }

    #[must_use]
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// The number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Opens the body of the current element with `{`.
    ///
    /// [`start_element`](ElementWriter::start_element) calls this on its own
    /// when a child is started, so explicit calls are only needed for empty
    /// bodies.
    ///
    /// # Errors
    ///
    /// Returns a usage error when no element is open or its body is
    /// already open.
    pub fn start_body(&mut self) -> Result<()> {
        match self.status {
            Status::Top | Status::Body => {
                return Err(Error::usage("no open element to start a body for"))
            }
            Status::Anonymous => self.write_anonymous_name()?,
            Status::Values | Status::Attributes => {}
        }
        self.put(" {")?;
        self.new_line()?;
        self.status = Status::Body;
        Ok(())
    }

    /// Closes the current body with `}`.
    ///
    /// # Errors
    ///
    /// Returns a usage error when no body is open.
    pub fn end_body(&mut self) -> Result<()> {
        if self.status != Status::Body || self.depth == 0 {
            return Err(Error::usage("no open body to end"));
        }
        self.depth -= 1;
        self.indent(self.depth)?;
        self.put("}")?;
        self.new_line()?;
        self.status = if self.depth == 0 { Status::Top } else { Status::Body };
        Ok(())
    }

    /// Writes `text` verbatim.
    pub fn raw(&mut self, text: &str) -> Result<()> {
        self.put(text)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Returns the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn put(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn new_line(&mut self) -> Result<()> {
        self.out.write_all(self.options.eol.as_bytes())?;
        Ok(())
    }

    fn indent(&mut self, depth: usize) -> Result<()> {
        for _ in 0..depth {
            self.out.write_all(self.options.indent.as_bytes())?;
        }
        Ok(())
    }

    /// An anonymous element with no value needs its name to re-parse.
    fn write_anonymous_name(&mut self) -> Result<()> {
        if self.status == Status::Anonymous {
            self.put(ANONYMOUS_TAG_NAME)?;
            self.status = Status::Values;
        }
        Ok(())
    }

    fn write_literal(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => {
                let quoted = self.quote(s);
                self.put(&quoted)
            }
            Value::Binary(bytes) => self.write_binary(bytes),
            other => self.put(&other.to_string()),
        }
    }

    fn quote(&self, s: &str) -> String {
        match self.options.quote {
            Quote::Backquote if !s.contains('`') && !s.contains('\r') => format!("`{}`", s),
            _ => format!("\"{}\"", escape_string(s)),
        }
    }

    /// Long payloads go on their own lines, one level deeper than the
    /// element, with the closing `]` aligned on the element.
    fn write_binary(&mut self, bytes: &[u8]) -> Result<()> {
        let encoded = general_purpose::STANDARD.encode(bytes);
        if encoded.len() <= BASE64_WRAP_LINE_LENGTH {
            return self.put(&format!("[{}]", encoded));
        }

        self.put("[")?;
        self.new_line()?;
        // base64 output is ASCII, so byte chunks are char boundaries
        for chunk in encoded.as_bytes().chunks(BASE64_WRAP_LINE_LENGTH) {
            self.indent(self.depth)?;
            self.out.write_all(chunk)?;
            self.new_line()?;
        }
        self.indent(self.depth.saturating_sub(1))?;
        self.put("]")
    }
}

/// Values whose text would not read back as the same value.
fn check_representable(value: &Value) -> Result<()> {
    match value {
        Value::Float32(f) if !f.is_finite() => Err(Error::usage(format!("{} has no SDL literal", f))),
        Value::Float64(f) if !f.is_finite() => Err(Error::usage(format!("{} has no SDL literal", f))),
        Value::DateTime(dt) if dt.nanosecond() % 1_000_000 != 0 || dt.nanosecond() >= 1_000_000_000 => {
            Err(Error::usage(format!(
                "{} is finer than the millisecond precision of SDL date-times",
                dt
            )))
        }
        Value::DateTime(dt) if dt.offset().local_minus_utc() % 60 != 0 => Err(Error::usage(format!(
            "offset {} of {} is not a whole number of minutes",
            dt.offset(),
            dt
        ))),
        _ => Ok(()),
    }
}

/// Keywords written as names would read back as literals.
fn check_not_keyword(namespace: &str, name: &str) -> Result<()> {
    match [namespace, name].into_iter().find(|s| is_keyword(s)) {
        Some(keyword) => Err(Error::usage(format!(
            "'{}' is a literal keyword and cannot be written as a name",
            keyword
        ))),
        None => Ok(()),
    }
}

impl<W: io::Write> ElementWriter for Writer<W> {
    fn start_element(&mut self, namespace: &str, name: &str) -> Result<()> {
        if name.is_empty() && !namespace.is_empty() {
            return Err(Error::usage(format!(
                "element in namespace '{}' has an empty name",
                namespace
            )));
        }
        check_not_keyword(namespace, name)?;

        if matches!(
            self.status,
            Status::Anonymous | Status::Values | Status::Attributes
        ) {
            self.start_body()?;
        }
        self.indent(self.depth)?;

        if is_anonymous(namespace, name) {
            self.status = Status::Anonymous;
        } else {
            if !namespace.is_empty() {
                self.put(namespace)?;
                self.put(":")?;
            }
            self.put(name)?;
            self.status = Status::Values;
        }

        self.depth += 1;
        self.last_value_was_date = false;
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        match self.status {
            Status::Top => return Err(Error::usage("no open element to end")),
            Status::Body => self.end_body()?,
            Status::Anonymous | Status::Values | Status::Attributes => {
                self.write_anonymous_name()?;
                self.depth -= 1;
                self.new_line()?;
                self.status = if self.depth == 0 { Status::Top } else { Status::Body };
            }
        }
        self.last_value_was_date = false;
        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<()> {
        check_representable(value)?;
        if matches!(self.status, Status::Top | Status::Body) {
            self.start_element("", "")?;
        }
        match self.status {
            Status::Anonymous => {}
            Status::Values => self.put(" ")?,
            _ => return Err(Error::usage("values must precede attributes")),
        }

        match value {
            // `2020/01/01 12:00:00` would read back as a single date-time
            Value::TimeSpan(span) if self.last_value_was_date => {
                self.put(&span.to_literal(true))?;
            }
            other => self.write_literal(other)?,
        }

        self.last_value_was_date = value.is_date();
        self.status = Status::Values;
        Ok(())
    }

    fn attribute(&mut self, namespace: &str, name: &str, value: &Value) -> Result<()> {
        check_not_keyword(namespace, name)?;
        check_representable(value)?;
        self.write_anonymous_name()?;
        if !matches!(self.status, Status::Values | Status::Attributes) {
            return Err(Error::usage(format!(
                "attribute '{}' outside of an element",
                name
            )));
        }

        self.put(" ")?;
        if !namespace.is_empty() {
            self.put(namespace)?;
            self.put(":")?;
        }
        self.put(name)?;
        self.put("=")?;
        self.write_literal(value)?;

        self.status = Status::Attributes;
        self.last_value_was_date = false;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Values,
    Attributes,
    Body,
}

/// Builds a [`Tag`] tree from [`ElementWriter`] calls.
///
/// # Examples
///
/// ```rust
/// use sdlang::{ElementWriter, TagBuilder, Value};
///
/// let mut builder = TagBuilder::new();
/// builder.element("", "matrix", |b| {
///     b.element("", "", |row| row.values(&[Value::from(1), Value::from(2)]))?;
///     b.element("", "", |row| row.values(&[Value::from(3), Value::from(4)]))
/// }).unwrap();
///
/// let root = builder.into_root().unwrap();
/// let matrix = root.child("matrix").unwrap();
/// assert_eq!(matrix.child_count(), 2);
/// assert_eq!(matrix.children()[1].values(), &[Value::Int32(3), Value::Int32(4)]);
/// ```
#[derive(Debug)]
pub struct TagBuilder {
    stack: Vec<(Tag, FrameState)>,
}

impl Default for TagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TagBuilder {
    /// Starts with an empty root tag.
    #[must_use]
    pub fn new() -> Self {
        TagBuilder {
            stack: vec![(Tag::root(), FrameState::Body)],
        }
    }

    /// The element currently being built.
    #[must_use]
    pub fn current(&self) -> &Tag {
        // the root frame is never popped
        &self.stack[self.stack.len() - 1].0
    }

    /// Returns the root once every element is closed.
    ///
    /// # Errors
    ///
    /// Returns a usage error while elements are still open.
    pub fn into_root(mut self) -> Result<Tag> {
        if self.stack.len() != 1 {
            return Err(Error::usage(format!(
                "{} element(s) left open",
                self.stack.len() - 1
            )));
        }
        self.stack
            .pop()
            .map(|(root, _)| root)
            .ok_or_else(|| Error::usage("builder has no root"))
    }

    fn top(&mut self) -> Result<&mut (Tag, FrameState)> {
        self.stack
            .last_mut()
            .ok_or_else(|| Error::usage("builder has no root"))
    }
}

impl ElementWriter for TagBuilder {
    fn start_element(&mut self, namespace: &str, name: &str) -> Result<()> {
        let tag = if is_anonymous(namespace, name) {
            Tag::anonymous()
        } else {
            Tag::with_namespace(namespace, name)?
        };
        self.top()?.1 = FrameState::Body;
        self.stack.push((tag, FrameState::Values));
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(Error::usage("no open element to end"));
        }
        if let Some((tag, _)) = self.stack.pop() {
            self.top()?.0.add_child(tag);
        }
        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<()> {
        if self.stack.len() == 1 || self.top()?.1 == FrameState::Body {
            self.start_element("", "")?;
        }
        let (tag, state) = self.top()?;
        if *state != FrameState::Values {
            return Err(Error::usage("values must precede attributes"));
        }
        tag.add_value(value.clone());
        Ok(())
    }

    fn attribute(&mut self, namespace: &str, name: &str, value: &Value) -> Result<()> {
        if self.stack.len() == 1 {
            return Err(Error::usage(format!(
                "attribute '{}' outside of an element",
                name
            )));
        }
        let (tag, state) = self.top()?;
        if *state == FrameState::Body {
            return Err(Error::usage(format!(
                "attribute '{}' after the children of its element",
                name
            )));
        }
        tag.set_attribute_ns(namespace, name, value.clone())?;
        *state = FrameState::Attributes;
        Ok(())
    }
}
