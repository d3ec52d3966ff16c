//! Error types for SDL reading and writing.
//!
//! Every malformation is fatal to the parse or write call that detected it;
//! there is no warning tier and no recovery.
//!
//! ## Error Categories
//!
//! - **Lexical errors**: an unexpected character or an unterminated literal
//! - **Syntax errors**: a valid token in a place the grammar does not allow it
//! - **Literal errors**: a well-formed token whose text fails typed conversion
//!   (bad base64, impossible date, `1.2.3`, integer out of range)
//! - **Usage errors**: misuse of the writer, tag or tokenizer API
//!
//! Positions are 1-based. Lexical, syntax and literal errors raised while
//! parsing carry the line and column of the offending token, plus the source
//! line when it is still available.
//!
//! ## Examples
//!
//! ```rust
//! use sdlang::{from_str, Error};
//!
//! let err = from_str("tag1 xyz").unwrap_err();
//! assert!(matches!(err, Error::Syntax { .. }));
//! assert_eq!(err.line(), Some(1));
//! assert_eq!(err.column(), Some(9));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors raised while reading or writing SDL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Unexpected character or unterminated literal
    #[error("Lexical error at line {line}, column {col}: {msg}{}", display_source(.source_line))]
    Lexical {
        line: usize,
        col: usize,
        msg: String,
        source_line: Option<String>,
    },

    /// Token not permitted in the current parser state
    #[error("Syntax error at line {line}, column {col}: {msg}{}", display_source(.source_line))]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        source_line: Option<String>,
    },

    /// Token text that could not be converted into a typed value
    #[error("Literal error at line {line}, column {col}: {msg}{}", display_source(.source_line))]
    Literal {
        line: usize,
        col: usize,
        msg: String,
        source_line: Option<String>,
    },

    /// Programmatic misuse of the API
    #[error("Usage error: {0}")]
    Usage(String),

    /// A host value with no SDL literal counterpart
    #[error("{type_name} is not coercible to an SDL type")]
    NotCoercible { type_name: String },

    /// A tag, namespace or attribute name that breaks the identifier grammar
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn display_source(source_line: &Option<String>) -> String {
    source_line
        .as_deref()
        .map(|line| format!("\n{}", line))
        .unwrap_or_default()
}

impl Error {
    /// Creates a lexical error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::Error;
    ///
    /// let err = Error::lexical(3, 7, "unexpected char: <*>");
    /// assert!(err.to_string().contains("line 3, column 7"));
    /// ```
    pub fn lexical(line: usize, col: usize, msg: &str) -> Self {
        Error::Lexical {
            line,
            col,
            msg: msg.to_string(),
            source_line: None,
        }
    }

    /// Creates a syntax error at the given position.
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            source_line: None,
        }
    }

    /// Creates a literal conversion error with no position yet.
    ///
    /// The literal parsers are pure functions of the token text; the reader
    /// attaches the token position with [`Error::at`].
    pub fn literal<T: fmt::Display>(msg: T) -> Self {
        Error::Literal {
            line: 0,
            col: 0,
            msg: msg.to_string(),
            source_line: None,
        }
    }

    /// Creates a usage error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::Error;
    ///
    /// let err = Error::usage("only one token can be pushed back");
    /// assert!(err.to_string().starts_with("Usage error"));
    /// ```
    pub fn usage<T: fmt::Display>(msg: T) -> Self {
        Error::Usage(msg.to_string())
    }

    /// Creates a "not coercible" error naming the offending host type.
    pub fn not_coercible(type_name: &str) -> Self {
        Error::NotCoercible {
            type_name: type_name.to_string(),
        }
    }

    /// Creates an invalid identifier error.
    pub fn invalid_identifier<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidIdentifier(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Moves a positioned error to `line`/`col`. Other variants are returned unchanged.
    #[must_use]
    pub fn at(mut self, line: usize, col: usize) -> Self {
        match &mut self {
            Error::Lexical { line: l, col: c, .. }
            | Error::Syntax { line: l, col: c, .. }
            | Error::Literal { line: l, col: c, .. } => {
                *l = line;
                *c = col;
            }
            _ => {}
        }
        self
    }

    /// Attaches the offending source line to a positioned error.
    #[must_use]
    pub fn with_source_line(mut self, text: Option<&str>) -> Self {
        match &mut self {
            Error::Lexical { source_line, .. }
            | Error::Syntax { source_line, .. }
            | Error::Literal { source_line, .. } => {
                *source_line = text.map(|s| s.trim_end_matches(&['\n', '\r'][..]).to_string());
            }
            _ => {}
        }
        self
    }

    /// The 1-based line of a parse error.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lexical { line, .. } | Error::Syntax { line, .. } | Error::Literal { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }

    /// The 1-based column of a parse error.
    #[must_use]
    pub fn column(&self) -> Option<usize> {
        match self {
            Error::Lexical { col, .. } | Error::Syntax { col, .. } | Error::Literal { col, .. } => {
                Some(*col)
            }
            _ => None,
        }
    }

    /// The source line a parse error points into, when it was still available.
    #[must_use]
    pub fn source_line(&self) -> Option<&str> {
        match self {
            Error::Lexical { source_line, .. }
            | Error::Syntax { source_line, .. }
            | Error::Literal { source_line, .. } => source_line.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` for errors raised while parsing text.
    #[inline]
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Lexical { .. } | Error::Syntax { .. } | Error::Literal { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
