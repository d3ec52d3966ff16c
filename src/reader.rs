//! Pull parser producing element events, and tree building on top of it.
//!
//! [`Reader`] turns the token stream of a [`Tokenizer`] into a sequence of
//! [`Event`]s. Each call to [`Reader::read`] returns the next event:
//!
//! - [`Event::Start`] carries a complete [`Element`]: its name, values and
//!   attributes in source order. An element without a body is flagged as
//!   self-closing and is not followed by an [`Event::End`].
//! - [`Event::End`] closes the body of the innermost element that opened one.
//!
//! [`Reader::read_tag`] and [`Reader::each_tag`] assemble the events into
//! [`Tag`] trees.
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{Event, Reader};
//!
//! let mut reader = Reader::from_str("server \"alpha\" port=80 {\n\tpath \"/\"\n}\n");
//!
//! let Some(Event::Start(server)) = reader.read().unwrap() else { panic!() };
//! assert_eq!(server.name(), "server");
//! assert_eq!(server.depth(), 1);
//! assert!(!server.is_self_closing());
//!
//! let Some(Event::Start(path)) = reader.read().unwrap() else { panic!() };
//! assert_eq!(path.depth(), 2);
//! assert!(path.is_self_closing());
//!
//! assert_eq!(reader.read().unwrap(), Some(Event::End));
//! assert_eq!(reader.read().unwrap(), None);
//! ```

use crate::literal::{
    decode_binary, parse_boolean, parse_character, parse_date, parse_double_quote_string,
    parse_float, parse_integer, parse_time,
};
use crate::map::QualifiedName;
use crate::tag::{Tag, ANONYMOUS_TAG_NAME};
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::zone::{FixedZoneResolver, ZoneResolver};
use crate::{Error, Result, Value};
use std::io::BufRead;
use tracing::debug;

/// A parsing event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An element with everything up to its body or the end of its statement
    Start(Element),
    /// The `}` closing the body of the innermost open element
    End,
}

/// An element as seen by the pull parser.
///
/// Unlike [`Tag`], attributes keep their source order and duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    namespace: String,
    name: String,
    depth: usize,
    values: Vec<Value>,
    attributes: Vec<(QualifiedName, Value)>,
    self_closing: bool,
}

impl Element {
    fn new(namespace: String, name: String, depth: usize) -> Self {
        Element {
            namespace,
            name,
            depth,
            values: Vec::new(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting level; top-level elements are at depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }

    /// All attributes in source order, duplicates included.
    #[must_use]
    pub fn attributes(&self) -> &[(QualifiedName, Value)] {
        &self.attributes
    }

    /// The last attribute with this name in the default namespace.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attribute_ns("", name)
    }

    #[must_use]
    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .rev()
            .find(|(key, _)| key.namespace == namespace && key.name == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn attribute_at(&self, index: usize) -> Option<(&QualifiedName, &Value)> {
        self.attributes.get(index).map(|(key, value)| (key, value))
    }

    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// True when the element has no body.
    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.namespace.is_empty() && self.name == ANONYMOUS_TAG_NAME
    }

    /// Converts into a childless [`Tag`]. A repeated attribute keeps its last value.
    #[must_use]
    pub fn into_tag(self) -> Tag {
        let mut tag = Tag::new_unchecked(self.namespace, self.name);
        tag.set_values(self.values);
        for (key, value) in self.attributes {
            tag.set_attribute_unchecked(key.namespace, key.name, value);
        }
        tag
    }
}

/// A streaming SDL parser over any buffered reader.
///
/// Also an [`Iterator`] over `Result<Event>` that stops after the first
/// error.
pub struct Reader<R> {
    tokenizer: Tokenizer<R>,
    resolver: Box<dyn ZoneResolver>,
    open_bodies: usize,
    finished: bool,
}

impl<'a> Reader<&'a [u8]> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Reader::new(input.as_bytes())
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(input: R) -> Self {
        Reader {
            tokenizer: Tokenizer::new(input),
            resolver: Box::new(FixedZoneResolver::new()),
            open_bodies: 0,
            finished: false,
        }
    }

    /// Replaces the resolver used for the zones of date-time literals.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::FixedOffset;
    /// use sdlang::Reader;
    ///
    /// let mut reader = Reader::from_str("at 2024/01/01 10:00-LOCAL")
    ///     .with_zone_resolver(|zone: &str| (zone == "LOCAL").then(|| FixedOffset::east_opt(7200)).flatten());
    /// let root = reader.read_tag().unwrap();
    /// let at = root.children()[0].value().unwrap().as_date_time().unwrap();
    /// assert_eq!(at.offset().local_minus_utc(), 7200);
    /// ```
    #[must_use]
    pub fn with_zone_resolver(mut self, resolver: impl ZoneResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// The nesting level of the next element: 1 at top level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open_bodies + 1
    }

    /// Returns the next event, or `None` at the end of the document.
    ///
    /// # Errors
    ///
    /// Returns lexical, syntax or literal errors positioned at the offending
    /// token. After an error, every further call returns `Ok(None)`.
    pub fn read(&mut self) -> Result<Option<Event>> {
        if self.finished {
            return Ok(None);
        }
        let event = self.read_event();
        if !matches!(event, Ok(Some(_))) {
            self.finished = true;
        }
        event
    }

    /// Reads the rest of the document into a root tag.
    ///
    /// # Errors
    ///
    /// Propagates parse errors. Calling this after a body was opened with
    /// [`Reader::read`] is a usage error once that body closes.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let mut open = vec![Tag::root()];
        while let Some(event) = self.read()? {
            let complete = match event {
                Event::Start(element) if element.is_self_closing() => element.into_tag(),
                Event::Start(element) => {
                    open.push(element.into_tag());
                    continue;
                }
                Event::End if open.len() > 1 => open.pop().unwrap_or_else(Tag::root),
                Event::End => return Err(Self::unbalanced()),
            };
            if let Some(parent) = open.last_mut() {
                parent.add_child(complete);
            }
        }
        Ok(open.swap_remove(0))
    }

    /// Calls `f` with every tag once it is complete, children included.
    ///
    /// With `only_top_level`, nested tags are only seen as children of their
    /// top-level ancestor.
    ///
    /// # Errors
    ///
    /// Propagates parse errors and the first error returned by `f`.
    pub fn each_tag<F>(&mut self, only_top_level: bool, mut f: F) -> Result<()>
    where
        F: FnMut(&Tag) -> Result<()>,
    {
        let mut open: Vec<Tag> = Vec::new();
        while let Some(event) = self.read()? {
            let complete = match event {
                Event::Start(element) if element.is_self_closing() => element.into_tag(),
                Event::Start(element) => {
                    open.push(element.into_tag());
                    continue;
                }
                Event::End => open.pop().ok_or_else(Self::unbalanced)?,
            };

            if !only_top_level || open.is_empty() {
                f(&complete)?;
            }
            if let Some(parent) = open.last_mut() {
                parent.add_child(complete);
            }
        }
        Ok(())
    }

    fn unbalanced() -> Error {
        Error::usage("a body was closed that opened before tree reading started")
    }

    fn read_event(&mut self) -> Result<Option<Event>> {
        loop {
            let token = self.tokenizer.next()?;
            match token.kind {
                TokenKind::Whitespace
                | TokenKind::Eol
                | TokenKind::Semicolon
                | TokenKind::OneLineComment
                | TokenKind::InlineComment => {}
                TokenKind::MultilineCommentStart => self.skip_multiline_comment()?,
                TokenKind::Eof if self.open_bodies == 0 => {
                    debug!("end of document");
                    return Ok(None);
                }
                TokenKind::Eof => {
                    return Err(self.syntax_error(&token, "unexpected end of input: missing '}'"));
                }
                TokenKind::BlockEnd if self.open_bodies == 0 => {
                    return Err(self.syntax_error(&token, "unexpected '}' with no open body"));
                }
                TokenKind::BlockEnd => {
                    self.open_bodies -= 1;
                    debug!(depth = self.open_bodies + 1, "end element");
                    return Ok(Some(Event::End));
                }
                TokenKind::Identifier => {
                    let (namespace, name) = self.read_name(token)?;
                    let element = Element::new(namespace, name, self.depth());
                    return self.read_element(element).map(Some);
                }
                kind if kind.is_value_start() => {
                    let mut element =
                        Element::new(String::new(), ANONYMOUS_TAG_NAME.to_string(), self.depth());
                    let value = self.read_value(token)?;
                    element.values.push(value);
                    return self.read_element(element).map(Some);
                }
                _ => return Err(self.unexpected(&token)),
            }
        }
    }

    /// Reads values, attributes and the opening brace after an element name.
    fn read_element(&mut self, mut element: Element) -> Result<Event> {
        loop {
            let token = self.tokenizer.next()?;
            match token.kind {
                TokenKind::Whitespace
                | TokenKind::LineContinuation
                | TokenKind::OneLineComment
                | TokenKind::InlineComment => {}
                TokenKind::MultilineCommentStart => self.skip_multiline_comment()?,
                TokenKind::Eol | TokenKind::Semicolon => {
                    element.self_closing = true;
                    break;
                }
                // `}` and end of input end the statement and are handled by the caller
                TokenKind::BlockEnd | TokenKind::Eof => {
                    self.tokenizer.unread()?;
                    element.self_closing = true;
                    break;
                }
                TokenKind::BlockStart => {
                    self.open_bodies += 1;
                    break;
                }
                TokenKind::Identifier => {
                    let (namespace, name) = self.read_name(token)?;
                    let value_token = self.read_equal()?;
                    let value = self.read_value(value_token)?;
                    element.attributes.push((QualifiedName::new(namespace, name), value));
                }
                kind if kind.is_value_start() => {
                    if !element.attributes.is_empty() {
                        return Err(self.syntax_error(&token, "values must precede attributes"));
                    }
                    let value = self.read_value(token)?;
                    element.values.push(value);
                }
                _ => return Err(self.unexpected(&token)),
            }
        }

        debug!(
            namespace = %element.namespace,
            name = %element.name,
            depth = element.depth,
            values = element.values.len(),
            attributes = element.attributes.len(),
            self_closing = element.self_closing,
            "start element"
        );
        Ok(Event::Start(element))
    }

    /// Completes `ns:name` after its first identifier.
    fn read_name(&mut self, first: Token) -> Result<(String, String)> {
        let token = self.tokenizer.next()?;
        if token.kind != TokenKind::Colon {
            self.tokenizer.unread()?;
            return Ok((String::new(), first.text));
        }

        let name = self.tokenizer.next()?;
        if name.kind != TokenKind::Identifier {
            return Err(self.unexpected(&name));
        }
        Ok((first.text, name.text))
    }

    /// Consumes `=` and returns the first token of the attribute value.
    fn read_equal(&mut self) -> Result<Token> {
        let mut token = self.tokenizer.next()?;
        while token.kind == TokenKind::Whitespace {
            token = self.tokenizer.next()?;
        }
        if token.kind != TokenKind::Equal {
            return Err(self.unexpected(&token));
        }

        token = self.tokenizer.next()?;
        while matches!(token.kind, TokenKind::Whitespace | TokenKind::LineContinuation) {
            token = self.tokenizer.next()?;
        }
        Ok(token)
    }

    fn read_value(&mut self, token: Token) -> Result<Value> {
        let converted = match token.kind {
            TokenKind::Null => Ok(Value::Null),
            TokenKind::Boolean => parse_boolean(&token.text).map(Value::Bool),
            TokenKind::Integer => parse_integer(&token.text),
            TokenKind::Float => parse_float(&token.text),
            TokenKind::Character => parse_character(&token.text).map(Value::Char),
            TokenKind::InlineBackquoteString => Ok(Value::String(token.text.clone())),
            TokenKind::InlineDoubleQuoteString => {
                parse_double_quote_string(&token.text).map(Value::String)
            }
            TokenKind::MultilineBackquoteStringStart => self
                .read_multiline(
                    token.text.clone(),
                    TokenKind::MultilineBackquoteStringPart,
                    TokenKind::MultilineBackquoteStringEnd,
                    true,
                )
                .map(Value::String),
            TokenKind::MultilineDoubleQuoteStringStart => self
                .read_multiline(
                    token.text.clone(),
                    TokenKind::MultilineDoubleQuoteStringPart,
                    TokenKind::MultilineDoubleQuoteStringEnd,
                    false,
                )
                .and_then(|text| parse_double_quote_string(&text))
                .map(Value::String),
            TokenKind::InlineBinary => decode_binary(&token.text).map(Value::Binary),
            TokenKind::MultilineBinaryStart => self
                .read_multiline(
                    token.text.clone(),
                    TokenKind::MultilineBinaryPart,
                    TokenKind::MultilineBinaryEnd,
                    false,
                )
                .and_then(|text| decode_binary(&text))
                .map(Value::Binary),
            TokenKind::Date => self.read_date(&token),
            TokenKind::TimeOrTimespan => parse_time(&token.text)
                .and_then(|time| time.to_time_span())
                .map(Value::TimeSpan),
            _ => return Err(self.unexpected(&token)),
        };
        converted.map_err(|e| self.locate(e, &token))
    }

    /// Joins the pieces of a literal spanning lines. With `keep_blank_lines`,
    /// every empty line inside the literal contributes a line break.
    fn read_multiline(
        &mut self,
        mut text: String,
        part: TokenKind,
        end: TokenKind,
        keep_blank_lines: bool,
    ) -> Result<String> {
        loop {
            let token = self.tokenizer.next()?;
            match token.kind {
                TokenKind::Eol => {
                    if keep_blank_lines {
                        text.push('\n');
                    }
                }
                kind if kind == part => text.push_str(&token.text),
                kind if kind == end => {
                    text.push_str(&token.text);
                    return Ok(text);
                }
                _ => return Err(self.unexpected(&token)),
            }
        }
    }

    /// A date followed by a time of day on the same statement forms a
    /// date-time. A time span (with a day component) stays a separate value.
    fn read_date(&mut self, date_token: &Token) -> Result<Value> {
        let date = parse_date(&date_token.text)?;

        let mut token = self.tokenizer.next()?;
        while token.kind == TokenKind::Whitespace {
            token = self.tokenizer.next()?;
        }
        if token.kind == TokenKind::TimeOrTimespan {
            let time = parse_time(&token.text).map_err(|e| self.locate(e, &token))?;
            if time.days.is_none() {
                return time
                    .on_date(date, self.resolver.as_ref())
                    .map(Value::DateTime)
                    .map_err(|e| self.locate(e, &token));
            }
        }

        self.tokenizer.unread()?;
        Ok(Value::Date(date))
    }

    fn skip_multiline_comment(&mut self) -> Result<()> {
        loop {
            let token = self.tokenizer.next()?;
            match token.kind {
                TokenKind::MultilineCommentEnd => return Ok(()),
                TokenKind::MultilineCommentPart | TokenKind::Eol => {}
                _ => return Err(self.unexpected(&token)),
            }
        }
    }

    /// Positions a literal error that does not carry a position yet.
    fn locate(&self, err: Error, token: &Token) -> Error {
        if err.line() == Some(0) {
            err.at(token.line, token.column)
                .with_source_line(self.tokenizer.source_line(token.line))
        } else {
            err
        }
    }

    fn syntax_error(&self, token: &Token, msg: &str) -> Error {
        Error::syntax(token.line, token.column, msg)
            .with_source_line(self.tokenizer.source_line(token.line))
    }

    fn unexpected(&self, token: &Token) -> Error {
        self.syntax_error(token, &format!("unexpected {}", token))
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<Event> {
        Reader::from_str(input).collect::<Result<Vec<_>>>().unwrap()
    }

    fn start(event: &Event) -> &Element {
        match event {
            Event::Start(element) => element,
            Event::End => panic!("expected a start event"),
        }
    }

    #[test]
    fn test_self_closing_has_no_end() {
        let events = events("a 1\nb 2");
        assert_eq!(events.len(), 2);
        assert!(start(&events[0]).is_self_closing());
        assert!(start(&events[1]).is_self_closing());
    }

    #[test]
    fn test_body_events() {
        let events = events("a {\n  b\n}\nc");
        assert_eq!(events.len(), 4);
        assert!(!start(&events[0]).is_self_closing());
        assert_eq!(start(&events[1]).depth(), 2);
        assert_eq!(events[2], Event::End);
        assert_eq!(start(&events[3]).depth(), 1);
    }

    #[test]
    fn test_duplicate_attributes_kept_in_order() {
        let events = events("a x=1 y=2 x=3");
        let element = start(&events[0]);
        assert_eq!(element.attribute_count(), 3);
        assert_eq!(element.attribute("x"), Some(&Value::Int32(3)));
        let (key, value) = element.attribute_at(1).unwrap();
        assert_eq!(key.name, "y");
        assert_eq!(value, &Value::Int32(2));

        let tag = element.clone().into_tag();
        assert_eq!(tag.attributes().len(), 2);
        assert_eq!(tag.attribute("x"), Some(&Value::Int32(3)));
    }

    #[test]
    fn test_closing_brace_ends_statement() {
        let events = events("a { b 1 }");
        assert_eq!(events.len(), 3);
        assert_eq!(start(&events[1]).values(), &[Value::Int32(1)]);
        assert_eq!(events[2], Event::End);
    }

    #[test]
    fn test_depth_tracks_bodies() {
        let mut reader = Reader::from_str("a {\n b {\n }\n}");
        assert_eq!(reader.depth(), 1);
        reader.read().unwrap();
        assert_eq!(reader.depth(), 2);
        reader.read().unwrap();
        assert_eq!(reader.depth(), 3);
        reader.read().unwrap();
        assert_eq!(reader.depth(), 2);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut reader = Reader::from_str("a 1\n=\nb 2");
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_each_tag_all_levels() {
        let mut names = Vec::new();
        Reader::from_str("a {\n b\n c {\n  d\n }\n}\ne")
            .each_tag(false, |tag| {
                names.push(tag.name().to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(names, vec!["b", "d", "c", "a", "e"]);
    }

    #[test]
    fn test_each_tag_top_level_only() {
        let mut seen = Vec::new();
        Reader::from_str("a {\n b\n}\ne")
            .each_tag(true, |tag| {
                seen.push((tag.name().to_string(), tag.child_count()));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![("a".to_string(), 1), ("e".to_string(), 0)]);
    }

    #[test]
    fn test_each_tag_callback_error_stops() {
        let mut count = 0;
        let result = Reader::from_str("a\nb\nc").each_tag(true, |_| {
            count += 1;
            if count == 2 {
                Err(Error::custom("stop"))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_literal_error_positioned() {
        let err = Reader::from_str("a 1\nb 2008/13/01").read_tag().unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.column(), Some(3));
        assert_eq!(err.source_line(), Some("b 2008/13/01"));
    }
}
