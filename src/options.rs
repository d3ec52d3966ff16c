//! Configuration options for SDL output.
//!
//! This module provides types to customize the text the
//! [`Writer`](crate::writer::Writer) produces:
//!
//! - [`WriterOptions`]: Main configuration struct
//! - [`Quote`]: Choice of quote for string values
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{from_str, to_string_with_options, Quote, WriterOptions};
//!
//! let root = from_str("greeting \"hello\" {\n\tname \"world\"\n}\n").unwrap();
//!
//! let options = WriterOptions::new().with_indent("  ").with_quote(Quote::Backquote);
//! let sdl = to_string_with_options(&root, options).unwrap();
//! assert_eq!(sdl, "greeting `hello` {\n  name `world`\n}\n");
//! ```

use crate::error::{Error, Result};

/// Quote character for string values.
///
/// Backquoted strings are raw: the writer falls back to double quotes for a
/// string that contains a backquote or a carriage return, which a raw string
/// cannot represent.
///
/// # Examples
///
/// ```rust
/// use sdlang::Quote;
///
/// assert_eq!(Quote::Double.as_char(), '"');
/// assert_eq!(Quote::try_from('`').unwrap(), Quote::Backquote);
/// assert!(Quote::try_from('\'').is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quote {
    #[default]
    Double,
    Backquote,
}

impl Quote {
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Backquote => '`',
        }
    }
}

impl TryFrom<char> for Quote {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        match c {
            '"' => Ok(Quote::Double),
            '`' => Ok(Quote::Backquote),
            other => Err(Error::usage(format!(
                "unsupported string quote: {:?} (expected '\"' or '`')",
                other
            ))),
        }
    }
}

/// Configuration options for SDL output.
///
/// # Examples
///
/// ```rust
/// use sdlang::{Quote, WriterOptions};
///
/// let options = WriterOptions::new();
/// assert_eq!(options.indent, "\t");
/// assert_eq!(options.eol, "\n");
/// assert_eq!(options.quote, Quote::Double);
///
/// let options = WriterOptions::new().with_indent("    ").with_eol("\r\n");
/// assert_eq!(options.indent.len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterOptions {
    /// Written once per nesting level before each line
    pub indent: String,
    /// Line terminator
    pub eol: String,
    pub quote: Quote,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent: "\t".to_string(),
            eol: "\n".to_string(),
            quote: Quote::default(),
        }
    }
}

impl WriterOptions {
    /// Creates default options: tab indent, `\n` line ends, double quotes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn with_eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = quote;
        self
    }
}
